/// Describes a Flowgate specific error types.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Error caused by the error on the client side.
    ClientError,
    /// Error caused by the missing, invalid or unresolvable credentials.
    Unauthorized,
    /// Error caused by the functionality that isn't configured on the server side.
    NotConfigured,
    /// Error caused by the failure to reach the automation server.
    UpstreamFailure,
    /// Unknown error.
    Unknown,
}
