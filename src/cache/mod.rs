mod override_cache;
#[cfg(test)]
mod tests;

#[cfg(test)]
pub use override_cache::Override;
pub use override_cache::OverrideCache;
