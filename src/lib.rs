//! A crate for solving the 3x3 Rubik's cube with a staged genetic algorithm.
//!
//! The solver first builds a 2x2x3 block in the best of 12 orientations, then brings the cube into
//! the group generated by F and U, and finally solves it inside that group, either genetically or
//! by brute force. See [solver::StagedSolver].

#[macro_use]
extern crate lazy_static;

/// Module containing 3x3 cube constants.
pub mod constants;
pub mod error;
pub mod moves;
pub mod facelet;
/// Module containing the state and sequence evaluators.
pub mod eval;
pub mod trim;
pub mod genetic;
pub mod bruteforce;
/// Module containing functions for reading and generating scrambles.
pub mod scramble;
pub mod config;
pub mod solver;

use std::{fs, path::Path};

use bincode::{
    config::{standard, Configuration},
    error::DecodeError,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::Error;

const CONFIG: Configuration = standard();

pub fn write_table<P, T: Serialize>(path: P, table: &T) -> Result<(), Error>
where
    P: AsRef<Path>,
{
    let encoded = bincode::serde::encode_to_vec(table, CONFIG)?;
    fs::write(path, encoded)?;
    Ok(())
}

pub fn decode_table<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, Error> {
    let (decoded, written) = bincode::serde::decode_from_slice(bytes, CONFIG)?;
    let additional = bytes.len() - written;

    if additional != 0 {
        return Err(DecodeError::UnexpectedEnd { additional })?;
    }
    Ok(decoded)
}

#[cfg(test)]
mod test {
    use crate::*;

    #[test]
    fn test_table_roundtrip() {
        let path = std::env::temp_dir().join("gencube_test_table.bin");
        let table = vec![(1u16, "F".to_string()), (13, "U'".to_string())];
        write_table(&path, &table).unwrap();
        let bytes = fs::read(&path).unwrap();
        let decoded: Vec<(u16, String)> = decode_table(&bytes).unwrap();
        assert_eq!(decoded, table);
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_trailing_bytes() {
        let mut bytes = bincode::serde::encode_to_vec(7u8, CONFIG).unwrap();
        bytes.push(0);
        assert!(decode_table::<u8>(&bytes).is_err());
    }
}
