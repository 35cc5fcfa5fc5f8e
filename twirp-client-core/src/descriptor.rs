//! Static method descriptors.
//!
//! Every Twirp method is reachable at
//! `<server address>/twirp/<fully qualified service>/<method>`, always via POST.
//! The path is fixed when the descriptor is built, so calls never route at
//! runtime.

/// The literal path segment in front of every Twirp route.
pub const TWIRP_PATH_PREFIX: &str = "twirp";

/// Identity and route of one RPC method.
///
/// Descriptors are immutable and `'static`; any number of concurrent calls
/// may share one. Build them with [`method_descriptor!`](crate::method_descriptor).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    service: &'static str,
    method: &'static str,
    path: &'static str,
}

/// `/twirp/`, the start of every method path.
const PATH_ROOT: &str = "/twirp/";

const fn has_path_root(path: &str) -> bool {
    let (path, root) = (path.as_bytes(), PATH_ROOT.as_bytes());
    if path.len() <= root.len() {
        return false;
    }
    let mut i = 0;
    while i < root.len() {
        if path[i] != root[i] {
            return false;
        }
        i += 1;
    }
    true
}

impl MethodDescriptor {
    /// # Panics
    ///
    /// Panics (at compile time in const context) if `path` does not start
    /// with `/twirp/`.
    #[doc(hidden)]
    pub const fn from_parts(
        service: &'static str,
        method: &'static str,
        path: &'static str,
    ) -> Self {
        assert!(has_path_root(path), "method path must start with /twirp/");
        Self {
            service,
            method,
            path,
        }
    }

    /// Fully qualified service name (e.g. `us.xeserv.api.HelloWorld`).
    pub const fn service(&self) -> &'static str {
        self.service
    }

    /// Bare method name (e.g. `Speak`).
    pub const fn method(&self) -> &'static str {
        self.method
    }

    /// URL path, starting with `/twirp/`.
    pub const fn path(&self) -> &'static str {
        self.path
    }

    /// `<service>/<method>`, as used in logs and interceptor contexts.
    pub fn procedure(&self) -> &'static str {
        self.path.strip_prefix(PATH_ROOT).unwrap_or(self.path)
    }

    /// Full URL of this method on the given server.
    ///
    /// A trailing `/` on the address is dropped so the result never contains
    /// a doubled slash.
    pub fn url(&self, server_address: &str) -> String {
        let base = server_address.strip_suffix('/').unwrap_or(server_address);
        format!("{}{}", base, self.path)
    }
}

/// Build a [`MethodDescriptor`] in const context.
///
/// ```
/// use twirp_client_core::{MethodDescriptor, method_descriptor};
///
/// const SPEAK: MethodDescriptor = method_descriptor!("us.xeserv.api.HelloWorld", "Speak");
///
/// assert_eq!(SPEAK.path(), "/twirp/us.xeserv.api.HelloWorld/Speak");
/// assert_eq!(
///     SPEAK.url("http://localhost:3000"),
///     "http://localhost:3000/twirp/us.xeserv.api.HelloWorld/Speak",
/// );
/// ```
#[macro_export]
macro_rules! method_descriptor {
    ($service:literal, $method:literal) => {
        $crate::MethodDescriptor::from_parts(
            $service,
            $method,
            concat!("/twirp/", $service, "/", $method),
        )
    };
}
