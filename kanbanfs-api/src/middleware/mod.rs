/// Middleware modules for the API server
///
/// - `identity`: caller identity from the gateway-supplied `x-user-id` header

pub mod identity;
