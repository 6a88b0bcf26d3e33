//! CLI command implementations.

pub(crate) mod formats;
pub(crate) mod render;

pub(crate) use formats::FormatsArgs;
pub(crate) use render::RenderArgs;

use qd_config::{Config, FormatPlace};
use qd_renderer::{FormatRule, Place, Registry};

/// Build a format registry from the loaded configuration.
pub(crate) fn registry_from_config(config: &Config) -> Registry {
    config.formats.iter().fold(
        Registry::new().with_class_prefix(config.render.class_prefix.clone()),
        |registry, (name, format)| {
            let place = match format.place {
                FormatPlace::Tag => Place::Tag,
                FormatPlace::Class => Place::Class,
                FormatPlace::Style => Place::Style,
            };
            registry.with_rule(name.clone(), FormatRule::new(place, format.value.clone()))
        },
    )
}
