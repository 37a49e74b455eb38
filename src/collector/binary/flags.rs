//! Mount flag bitmask translation.
//!
//! Values are FreeBSD's `MNT_*` flags from `<sys/mount.h>` (`f_flags` of
//! `struct statfs`).

pub const MNT_RDONLY: u64 = 0x0000_0001;
pub const MNT_SYNCHRONOUS: u64 = 0x0000_0002;
pub const MNT_NOEXEC: u64 = 0x0000_0004;
pub const MNT_NOSUID: u64 = 0x0000_0008;
pub const MNT_NFS4ACLS: u64 = 0x0000_0010;
pub const MNT_UNION: u64 = 0x0000_0020;
pub const MNT_ASYNC: u64 = 0x0000_0040;
pub const MNT_SUIDDIR: u64 = 0x0010_0000;
pub const MNT_SOFTDEP: u64 = 0x0020_0000;
pub const MNT_NOSYMFOLLOW: u64 = 0x0040_0000;
pub const MNT_GJOURNAL: u64 = 0x0200_0000;
pub const MNT_MULTILABEL: u64 = 0x0400_0000;
pub const MNT_ACLS: u64 = 0x0800_0000;
pub const MNT_NOATIME: u64 = 0x1000_0000;
pub const MNT_NOCLUSTERR: u64 = 0x4000_0000;
pub const MNT_NOCLUSTERW: u64 = 0x8000_0000;

/// Output order of the option tokens. Independent of bit position.
const MOUNT_OPTIONS: &[(u64, &str)] = &[
    (MNT_SYNCHRONOUS, "sync"),
    (MNT_NOEXEC, "noexec"),
    (MNT_NOSUID, "nosuid"),
    (MNT_UNION, "union"),
    (MNT_ASYNC, "async"),
    (MNT_SUIDDIR, "suiddir"),
    (MNT_SOFTDEP, "softdep"),
    (MNT_NOSYMFOLLOW, "nosymfollow"),
    (MNT_GJOURNAL, "gjournal"),
    (MNT_MULTILABEL, "multilabel"),
    (MNT_ACLS, "acls"),
    (MNT_NOATIME, "noatime"),
    (MNT_NOCLUSTERR, "noclusterr"),
    (MNT_NOCLUSTERW, "noclusterw"),
    (MNT_NFS4ACLS, "nfs4acls"),
];

/// Translates a mount flag bitmask into a comma-separated option string.
///
/// Always starts with `ro` or `rw`. Unknown bits are ignored.
pub fn mount_options(flags: u64) -> String {
    let mut opts = String::from(if flags & MNT_RDONLY != 0 { "ro" } else { "rw" });
    for &(bit, name) in MOUNT_OPTIONS {
        if flags & bit != 0 {
            opts.push(',');
            opts.push_str(name);
        }
    }
    opts
}
