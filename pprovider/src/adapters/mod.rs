#[cfg(feature = "provider-anthropic")]
pub mod anthropic;
