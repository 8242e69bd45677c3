//! Names of the short audio cues understood by playback hosts.

pub const PROCESS: &str = "process";
pub const ERROR: &str = "error";
pub const FINISH: &str = "finish";
pub const NEXT_STEP: &str = "next_step";
pub const LISTEN: &str = "listen";
