//! Machine configuration.

use typed_builder::TypedBuilder;

/// Options for building a [`GameBoy`](crate::machine::GameBoy).
///
/// ```
/// use dmgboy_core::config::EmulatorConfig;
///
/// let config = EmulatorConfig::builder().step_limit(1_000).trace(true).build();
/// assert_eq!(config.step_limit, Some(1_000));
/// assert!(config.boot_rom.is_none());
/// ```
#[derive(Clone, Debug, Default, TypedBuilder)]
pub struct EmulatorConfig {
    /// 256-byte boot image. When set, execution starts at 0x0000 with the
    /// overlay mapped; otherwise the machine starts in the post-boot state.
    #[builder(default, setter(strip_option))]
    pub boot_rom: Option<Vec<u8>>,
    /// Stop after this many instructions.
    #[builder(default, setter(strip_option))]
    pub step_limit: Option<u64>,
    /// Log every instruction at `trace` level.
    #[builder(default)]
    pub trace: bool,
}
