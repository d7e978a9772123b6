pub mod decrypt;
pub mod filters;
pub mod gen_identity;
pub mod gen_key;
pub mod git_config;
pub mod merge;

pub use decrypt::decrypt;
pub use filters::{clean, diff, smudge};
pub use gen_identity::gen_identity;
pub use gen_key::gen_key;
pub use git_config::git_config;
pub use merge::merge_file;
