//! System-wide constants and default values.

/// Superuser identity, for both user and group ids.
pub const SUPERUSER_ID: u32 = 0;

/// Root of the confined filesystem view, entered right after `chroot(2)`.
pub const CONFINED_ROOT: &str = "/";

/// Default listen address for the example file server.
pub const DEFAULT_LISTEN: &str = "0.0.0.0:80";

/// Default unprivileged account the file server switches to.
pub const DEFAULT_USER: &str = "www";

/// Default directory the file server is confined to.
pub const DEFAULT_ROOT: &str = "/var/www/htdocs";

/// Application name used in CLI output.
pub const APP_NAME: &str = "privjail";
