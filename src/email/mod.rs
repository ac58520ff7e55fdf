pub mod imap;
pub mod provider;
pub mod summary;

#[cfg(test)]
pub mod testing;
