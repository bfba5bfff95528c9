use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use gencube::{error::Error, moves::Move, scramble::scramble_to_str, solver::SolveResult};

/// Text log of a solve: the scramble, the setup rotations, one line per stage and the move count.
pub struct ResultLog {
    path: PathBuf,
}

impl ResultLog {
    /// Starts a new log at `path` with the scramble line, replacing any previous log.
    pub fn create<P: AsRef<Path>>(path: P, scramble: &[Move]) -> Result<Self, Error> {
        Self::create_with_header(path, &scramble_to_str(scramble))
    }

    /// Same as [ResultLog::create] for a scramble only known by its facelets.
    pub fn create_with_header<P: AsRef<Path>>(path: P, header: &str) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let mut file = File::create(&path).map_err(|e| sink_error(&path, e))?;
        writeln!(file, "{header}//Scramble").map_err(|e| sink_error(&path, e))?;
        Ok(Self { path })
    }

    fn append(&self, lines: &[String]) -> Result<(), Error> {
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|e| sink_error(&self.path, e))?;
        for line in lines {
            writeln!(file, "{line}").map_err(|e| sink_error(&self.path, e))?;
        }
        Ok(())
    }

    pub fn write_result(&self, result: &SolveResult) -> Result<(), Error> {
        let mut lines: Vec<String> = result.rotations.iter().map(|r| r.to_string()).collect();
        for stage in &result.stages {
            lines.push(format!("{}//{}", stage.notation(), stage.stage.tag()));
        }
        lines.push(format!("total moves # : {}", result.total_moves));
        self.append(&lines)
    }
}

fn sink_error(path: &Path, e: std::io::Error) -> Error {
    Error::LogSinkUnavailable(format!("{}: {}", path.display(), e))
}
