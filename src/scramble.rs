use std::{
    fs,
    io::BufRead,
    path::{Path, PathBuf},
    str::FromStr,
};

use log::warn;
use rand::Rng;

use crate::error::Error;
use crate::moves::{Move, MoveSet};
use crate::trim::trim_sequence;

/// Length of a random scramble when none is given.
pub const DEFAULT_SCRAMBLE_LENGTH: usize = 37;

/// Parses whitespace separated moves, failing on the first malformed token.
pub fn scramble_from_str(s: &str) -> Result<Vec<Move>, Error> {
    s.split_whitespace().map(Move::from_str).collect()
}

/// Parses whitespace separated moves, repairing malformed tokens with [Move::parse_lenient].
pub fn scramble_from_str_lenient(s: &str) -> Vec<Move> {
    s.split_whitespace().map(parse_token).collect()
}

fn parse_token(token: &str) -> Move {
    Move::from_str(token).unwrap_or_else(|e| {
        let m = Move::parse_lenient(token);
        warn!("{}, read as {}", e, m);
        m
    })
}

pub fn scramble_to_str(s: &[Move]) -> String {
    s.iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// `length` uniformly drawn moves, trimmed. Trimming keeps the length.
pub fn gen_scramble<R: Rng + ?Sized>(length: usize, rng: &mut R) -> Vec<Move> {
    let mut scramble: Vec<Move> = (0..length).map(|_| MoveSet::Full.random(rng)).collect();
    trim_sequence(&mut scramble, MoveSet::Full, rng);
    scramble
}

/// Reads a scramble from a text file. A missing, unreadable or empty file is
/// [Error::SourceUnavailable].
pub fn read_scramble_file<P: AsRef<Path>>(path: P) -> Result<Vec<Move>, Error> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| Error::SourceUnavailable(format!("{}: {}", path.display(), e)))?;
    let scramble = scramble_from_str_lenient(&content);
    if scramble.is_empty() {
        return Err(Error::SourceUnavailable(format!("{} is empty", path.display())));
    }
    Ok(scramble)
}

/// Reads `count` moves, one per line.
pub fn read_scramble_lines<B: BufRead>(reader: B, count: usize) -> Result<Vec<Move>, Error> {
    let mut scramble = Vec::with_capacity(count);
    for line in reader.lines().take(count) {
        scramble.push(parse_token(&line?));
    }
    if scramble.len() < count {
        return Err(Error::SourceUnavailable(format!(
            "expected {} moves, got {}",
            count,
            scramble.len()
        )));
    }
    Ok(scramble)
}

/// Where the scramble to solve comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ScrambleSource {
    /// Moves given directly.
    Moves(Vec<Move>),
    /// A text file of whitespace separated moves.
    File(PathBuf),
    /// A random scramble of the given length.
    Random(usize),
    /// The given number of moves typed on stdin, one per line.
    Interactive(usize),
}

impl ScrambleSource {
    /// Produces the scramble. Any unavailable source falls back to a random scramble of
    /// [DEFAULT_SCRAMBLE_LENGTH] moves.
    pub fn resolve<R: Rng + ?Sized>(self, rng: &mut R) -> Vec<Move> {
        let read = match self {
            ScrambleSource::Moves(moves) => Ok(moves),
            ScrambleSource::File(path) => read_scramble_file(path),
            ScrambleSource::Random(length) => return gen_scramble(length, rng),
            ScrambleSource::Interactive(count) => {
                read_scramble_lines(std::io::stdin().lock(), count)
            }
        };
        read.unwrap_or_else(|e| {
            warn!("{}, using a random scramble", e);
            gen_scramble(DEFAULT_SCRAMBLE_LENGTH, rng)
        })
    }
}

#[cfg(test)]
mod test {
    use rand::{rngs::StdRng, SeedableRng};

    use crate::moves::Move::*;
    use crate::scramble::*;
    use crate::trim::is_trimmed;

    #[test]
    fn test_scramble_from_str() {
        let m = vec![R, U, R3, U3, F, L3, D3, B2, R3, U3];
        assert_eq!(scramble_from_str("R U R' U' F L' D' B2 R' U'").unwrap(), m);
        assert!(matches!(
            scramble_from_str("R U X2"),
            Err(Error::MalformedScrambleToken(_))
        ));
        assert!(scramble_from_str("").unwrap().is_empty());
    }

    #[test]
    fn test_scramble_from_str_lenient() {
        assert_eq!(scramble_from_str_lenient(" r u2\n Q' b "), vec![R, U2, F3, B]);
    }

    #[test]
    fn test_scramble_to_str() {
        let m = vec![R, U, R3, U3, F, L3, D3, B2, R3, U3];
        assert_eq!(scramble_to_str(&m), "R U R' U' F L' D' B2 R' U'");
        assert_eq!(scramble_to_str(&[]), "");
    }

    #[test]
    fn test_gen_scramble() {
        let mut rng = StdRng::seed_from_u64(25);
        let ss = gen_scramble(25, &mut rng);
        assert_eq!(ss.len(), 25);
        assert!(is_trimmed(&ss));
    }

    #[test]
    fn test_read_scramble_lines() {
        let input = "R\nu'\nF2\nD\n";
        assert_eq!(read_scramble_lines(input.as_bytes(), 3).unwrap(), vec![R, U3, F2]);
        assert!(matches!(
            read_scramble_lines("R\n".as_bytes(), 2),
            Err(Error::SourceUnavailable(_))
        ));
    }

    #[test]
    fn test_read_scramble_file() {
        let dir = std::env::temp_dir();
        let path = dir.join("gencube_test_scramble.txt");
        fs::write(&path, "U R' F2 U\n").unwrap();
        assert_eq!(read_scramble_file(&path).unwrap(), vec![U, R3, F2, U]);

        let empty = dir.join("gencube_test_empty.txt");
        fs::write(&empty, "  \n").unwrap();
        assert!(matches!(
            read_scramble_file(&empty),
            Err(Error::SourceUnavailable(_))
        ));
        assert!(matches!(
            read_scramble_file(dir.join("gencube_missing_scramble.txt")),
            Err(Error::SourceUnavailable(_))
        ));
        fs::remove_file(path).unwrap();
        fs::remove_file(empty).unwrap();
    }

    #[test]
    fn test_resolve_falls_back_to_random() {
        let mut rng = StdRng::seed_from_u64(9);
        let moves = ScrambleSource::Moves(vec![F, U]).resolve(&mut rng);
        assert_eq!(moves, vec![F, U]);
        let random = ScrambleSource::Random(12).resolve(&mut rng);
        assert_eq!(random.len(), 12);
        let missing = ScrambleSource::File("/nonexistent/scramble.txt".into()).resolve(&mut rng);
        assert_eq!(missing.len(), DEFAULT_SCRAMBLE_LENGTH);
    }
}
