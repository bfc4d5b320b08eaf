// src/convert/features.rs

//! Toolchain features derived from sanitizer and LTO properties

use super::ConversionError;
use super::context::ModuleContext;
use crate::attribute::{Attribute, StringListAttribute};
use crate::module::ConfiguredProps;

const THIN_LTO_FEATURE: &str = "android_thin_lto";
const WHOLE_PROGRAM_VTABLES_FEATURE: &str = "android_thin_lto_whole_program_vtables";

/// LTO state of one configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LtoSetting {
    pub enabled: bool,
    pub whole_program_vtables: bool,
}

pub fn sanitizer_features(views: &[ConfiguredProps]) -> StringListAttribute {
    let mut features = StringListAttribute::new();
    for view in views {
        let sanitize = &view.props.sanitize;
        let mut values = Vec::new();
        if sanitize.integer_overflow == Some(true) {
            values.push("ubsan_integer_overflow".to_string());
        }
        values.extend(sanitize.misc_undefined.iter().map(|name| format!("ubsan_{name}")));
        features.set_select_value(&view.axis, &view.key, values);
    }
    features
}

/// Thin LTO on, off, or left to the toolchain, as feature flags
///
/// `lto.thin` together with `lto.never` on the same configuration is a
/// module error.
pub fn lto_features(ctx: &mut ModuleContext<'_>, views: &[ConfiguredProps]) -> StringListAttribute {
    let mut settings: Attribute<Option<LtoSetting>> = Attribute::new();
    for view in views {
        let props = &view.props;
        let setting = match (props.lto.thin, props.lto.never) {
            (Some(true), Some(true)) => {
                ctx.module_error(ConversionError::LtoConflict {
                    axis: view.axis.to_string(),
                    key: view.key.clone(),
                });
                None
            }
            (Some(true), _) => Some(LtoSetting {
                enabled: true,
                whole_program_vtables: props.whole_program_vtables == Some(true),
            }),
            (Some(false), _) | (_, Some(true)) => Some(LtoSetting {
                enabled: false,
                whole_program_vtables: false,
            }),
            _ => None,
        };
        settings.set_select_value(&view.axis, &view.key, setting);
    }

    let converted = settings.to_string_list(|setting, _, _| match setting {
        None => Vec::new(),
        Some(setting) if !setting.enabled => vec![format!("-{THIN_LTO_FEATURE}")],
        Some(setting) => {
            let mut features = vec![THIN_LTO_FEATURE.to_string()];
            if setting.whole_program_vtables {
                features.push(WHOLE_PROGRAM_VTABLES_FEATURE.to_string());
            }
            features
        }
    });
    match converted {
        Ok(features) => features,
        Err(err) => {
            ctx.module_error(ConversionError::Lto(err));
            StringListAttribute::new()
        }
    }
}
