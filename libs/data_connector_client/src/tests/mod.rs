mod client_tests;
mod hosts_tests;
