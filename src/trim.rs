use rand::Rng;

use crate::moves::{Move, MoveSet};

/// Merges and cancels adjacent moves on the same face until none are left, keeping the length of
/// `moves` fixed.
///
/// Two merged moves leave one slot free, a cancelling pair leaves two. The remaining moves are
/// shifted left and the tail is refilled with fresh draws from `alphabet`. The scan restarts after
/// every rewrite since the refill may create new pairs.
pub fn trim_sequence<R: Rng + ?Sized>(moves: &mut [Move], alphabet: MoveSet, rng: &mut R) {
    trim_sequence_with(moves, || alphabet.random(rng));
}

/// [trim_sequence] with an arbitrary source of refill moves.
pub fn trim_sequence_with<F>(moves: &mut [Move], mut draw: F)
where
    F: FnMut() -> Move,
{
    let len = moves.len();
    while let Some(l) = (0..len.saturating_sub(1)).find(|&l| moves[l].is_same_layer(moves[l + 1])) {
        match moves[l].compose(moves[l + 1]) {
            Some(merged) => {
                moves[l] = merged;
                moves.copy_within(l + 2.., l + 1);
                moves[len - 1] = draw();
            }
            None => {
                moves.copy_within(l + 2.., l);
                moves[len - 2] = draw();
                moves[len - 1] = draw();
            }
        }
    }
}

/// True when no two adjacent moves turn the same face.
pub fn is_trimmed(moves: &[Move]) -> bool {
    moves.windows(2).all(|w| !w[0].is_same_layer(w[1]))
}

#[cfg(test)]
mod test {
    use rand::{rngs::StdRng, SeedableRng};

    use crate::moves::Move::*;
    use crate::moves::*;
    use crate::trim::*;

    fn scripted(moves: &[Move]) -> impl FnMut() -> Move + '_ {
        let mut it = moves.iter().cycle();
        move || *it.next().unwrap()
    }

    #[test]
    fn test_merge_quarters() {
        let mut seq = [F, F, R, U];
        trim_sequence_with(&mut seq, scripted(&[D]));
        assert_eq!(seq, [F2, R, U, D]);
    }

    #[test]
    fn test_cancel_pair() {
        let mut seq = [F, F3, R, U];
        trim_sequence_with(&mut seq, scripted(&[D, L]));
        assert_eq!(seq, [R, U, D, L]);

        let mut seq = [R2, R2, U];
        trim_sequence_with(&mut seq, scripted(&[L, D]));
        assert_eq!(seq, [U, L, D]);
    }

    #[test]
    fn test_chain() {
        let mut seq = [F, F, F, R];
        trim_sequence_with(&mut seq, scripted(&[D, B]));
        assert_eq!(seq, [F3, R, D, B]);

        let mut seq = [U, U, U, U, F];
        trim_sequence_with(&mut seq, scripted(&[R, B, L, D]));
        assert_eq!(seq, [F, R, B, L, D]);
    }

    #[test]
    fn test_cascade() {
        let mut seq = [F, R, R3, F3, U];
        trim_sequence_with(&mut seq, scripted(&[D, B, L, R]));
        assert_eq!(seq, [U, D, B, L, R]);
    }

    #[test]
    fn test_half_turn_rules() {
        let mut seq = [B2, B, U];
        trim_sequence_with(&mut seq, scripted(&[L]));
        assert_eq!(seq, [B3, U, L]);

        let mut seq = [B2, B3, U];
        trim_sequence_with(&mut seq, scripted(&[L]));
        assert_eq!(seq, [B, U, L]);

        let mut seq = [B3, B2, U];
        trim_sequence_with(&mut seq, scripted(&[L]));
        assert_eq!(seq, [B, U, L]);

        let mut seq = [B3, B3, U];
        trim_sequence_with(&mut seq, scripted(&[L]));
        assert_eq!(seq, [B2, U, L]);
    }

    #[test]
    fn test_short_sequences() {
        let mut empty: [Move; 0] = [];
        trim_sequence_with(&mut empty, scripted(&[F]));
        let mut single = [R];
        trim_sequence_with(&mut single, scripted(&[F]));
        assert_eq!(single, [R]);
    }

    #[test]
    fn test_fixed_point() {
        let mut rng = StdRng::seed_from_u64(2005);
        for alphabet in [MoveSet::Full, MoveSet::TwoGen] {
            for _ in 0..100 {
                let mut seq: Vec<Move> = (0..30).map(|_| alphabet.random(&mut rng)).collect();
                trim_sequence(&mut seq, alphabet, &mut rng);
                assert_eq!(seq.len(), 30);
                assert!(is_trimmed(&seq));
                assert!(seq.iter().all(|m| alphabet.contains(*m)));

                let once = seq.clone();
                trim_sequence(&mut seq, alphabet, &mut rng);
                assert_eq!(seq, once);
            }
        }
    }

    #[test]
    fn test_trim_keeps_cube_action() {
        use crate::facelet::FaceCube;
        let mut seq = [R, R, U, U3, F, L];
        let before = FaceCube::default().apply_moves(&seq[..4]);
        trim_sequence_with(&mut seq, scripted(&[D, B, D]));
        assert_eq!(seq[0], R2);
        assert_eq!(FaceCube::default().apply_moves(&seq[..1]), before);
    }
}
