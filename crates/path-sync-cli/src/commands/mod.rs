//! Command implementations for path-sync-cli

pub mod copy;
pub mod dep_update;
pub mod validate;

pub use copy::run_copy_command;
pub use dep_update::run_dep_update_command;
pub use validate::run_validate_command;

/// What a successful command did, for `--detailed-exit-code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    NoChanges,
    Changes,
}

impl Outcome {
    pub fn from_count(changes: usize) -> Self {
        if changes == 0 {
            Self::NoChanges
        } else {
            Self::Changes
        }
    }

    pub fn exit_code(self, detailed: bool) -> i32 {
        match (self, detailed) {
            (Self::Changes, true) => 1,
            _ => 0,
        }
    }
}
