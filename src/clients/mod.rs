pub mod griddap_client;
pub mod tabledap_client;
