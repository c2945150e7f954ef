//! Device operations for Cisco NX-OS switches.
//!
//! Built on [`nxkit_api`], this crate adds the utilities an automation
//! script needs around the raw NX-API transport:
//!
//! - **[`Device`]**: a switch endpoint plus a ready client, with `show`,
//!   `config` and `bash` helpers that map transport errors into
//!   [`CoreError`].
//! - **Checkpoints**: [`Device::set_checkpoint`], [`Device::get_diff`],
//!   [`Device::rollback`].
//! - **Filesystem**: [`Device::list_files`], [`Device::create_dir`],
//!   [`Device::delete_dir`], [`Device::full_dir_check`].
//! - **[`FileCopy`]**: MD5 and free-space pre-flight plus SCP transfer
//!   through an [`ScpTransport`]. The libssh2 implementation is enabled by
//!   the `scp` feature.
//! - **Facts**: [`Device::facts`], [`Device::hostname`],
//!   [`Device::feature_list`], [`Device::feature_enabled`].

pub mod checkpoint;
pub mod device;
pub mod error;
pub mod facts;
pub mod file_copy;
pub mod files;
#[cfg(feature = "scp")]
pub mod scp;
pub mod table;

pub use device::Device;
pub use error::CoreError;
pub use facts::{Facts, Fan, InterfaceStatus, Module, PowerSupply};
pub use file_copy::{Direction, FileCopy, ScpTransport};
pub use files::{DirCheck, split_file_path};
#[cfg(feature = "scp")]
pub use scp::Ssh2Scp;
