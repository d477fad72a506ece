//! Built-in preset definitions.
//!
//! Presets are authored as JSON values so they go through the same deserializer as
//! user-supplied preset files.

use serde_json::{Value, json};

use crate::foundation::error::{KinetypeError, KinetypeResult};
use crate::preset::model::Preset;

/// Names of the presets shipped with the crate, in catalog order.
pub const BUILTIN_PRESET_NAMES: [&str; 7] = [
    "neon",
    "liquid",
    "fire",
    "glitch",
    "morph",
    "minimal",
    "typewriter",
];

/// Parse every built-in preset.
pub fn builtin_presets() -> KinetypeResult<Vec<Preset>> {
    BUILTIN_PRESET_NAMES
        .iter()
        .map(|name| {
            let value = builtin_value(name).ok_or_else(|| KinetypeError::preset_not_found(*name))?;
            serde_json::from_value(value)
                .map_err(|e| KinetypeError::serde(format!("builtin preset '{name}': {e}")))
        })
        .collect()
}

/// JSON source of one built-in preset.
pub fn builtin_value(name: &str) -> Option<Value> {
    let v = match name {
        "neon" => neon(),
        "liquid" => liquid(),
        "fire" => fire(),
        "glitch" => glitch(),
        "morph" => morph(),
        "minimal" => minimal(),
        "typewriter" => typewriter(),
        _ => return None,
    };
    Some(v)
}

fn neon() -> Value {
    json!({
        "name": "neon",
        "description": "Electric tube glow with a soft flicker",
        "styles": {
            "fontSize": 96,
            "fontWeight": 700,
            "color": "#00f0ff",
            "background": "#05010f",
            "textShadow": "0 0 12px #00f0ff, 0 0 32px #ff00e6",
            "filter": "brightness(1.2)"
        },
        "animations": {
            "entrance": {
                "duration": 0.8,
                "ease": "back.out",
                "stagger": 0.05,
                "keyframes": [ { "opacity": 0, "scale": 0.4, "glow": 0 } ]
            },
            "loop": {
                "duration": 1.5,
                "ease": "sine.inOut",
                "repeat": -1,
                "yoyo": true,
                "stagger": { "each": 0.08, "from": "center" },
                "keyframes": [ { "glow": 1, "brightness": 1.4 } ]
            },
            "exit": {
                "duration": 0.6,
                "ease": "power2.in",
                "stagger": { "each": 0.03, "from": "end" },
                "keyframes": [ { "opacity": 0, "scale": 1.3, "glow": 0 } ]
            }
        },
        "particles": {
            "count": 30,
            "colors": ["#00f0ff", "#ff00e6"],
            "size": [1.5, 3.5],
            "velocity": [10, 40],
            "gravity": 0,
            "lifetime": 3
        }
    })
}

fn liquid() -> Value {
    json!({
        "name": "liquid",
        "description": "Characters settle like droplets and ripple in a slow wave",
        "styles": {
            "fontSize": 88,
            "fontWeight": 600,
            "color": "#4fc3ff",
            "background": "#021526"
        },
        "animations": {
            "entrance": {
                "duration": "900ms",
                "ease": "elastic.out",
                "stagger": { "each": 0.06, "from": "center" },
                "keyframes": [ { "opacity": 0, "y": 40, "scaleY": 0.3, "skewX": 15 } ]
            },
            "loop": {
                "duration": 2.4,
                "ease": "sine.inOut",
                "repeat": -1,
                "stagger": 0.1,
                "keyframes": [ { "y": -8 }, { "y": 8 }, { "y": 0 } ]
            },
            "exit": {
                "duration": 0.7,
                "ease": "power2.in",
                "stagger": { "each": 0.04, "from": "edges" },
                "keyframes": [ { "opacity": 0, "y": 40, "scaleY": 0.3 } ]
            }
        }
    })
}

fn fire() -> Value {
    json!({
        "name": "fire",
        "description": "Flickering embers rising off burning letters",
        "styles": {
            "fontSize": 92,
            "fontWeight": 800,
            "color": "#ff7a1a",
            "background": "#120300",
            "textShadow": "0 -4px 18px #ff3d00"
        },
        "animations": {
            "entrance": {
                "duration": 0.9,
                "ease": "power2.out",
                "stagger": { "each": 0.05, "from": "random" },
                "keyframes": [ { "opacity": 0, "y": 30, "brightness": 2 } ]
            },
            "loop": {
                "duration": 0.8,
                "ease": "sine.inOut",
                "repeat": -1,
                "yoyo": true,
                "stagger": { "amount": 0.4, "from": "random" },
                "keyframes": [
                    { "brightness": 1.3, "hueRotate": -10 },
                    { "brightness": 0.9, "hueRotate": 10 }
                ]
            },
            "exit": {
                "duration": 0.8,
                "ease": "power1.in",
                "stagger": { "each": 0.04, "from": "random" },
                "keyframes": [ { "opacity": 0, "y": -40, "blur": 8 } ]
            }
        },
        "particles": {
            "count": 60,
            "colors": ["#ff3d00", "#ff9100", "#ffd54f"],
            "size": [2, 6],
            "velocity": [30, 90],
            "gravity": -60,
            "lifetime": 1.6
        }
    })
}

fn glitch() -> Value {
    json!({
        "name": "glitch",
        "description": "Digital tearing with hue-split jitter",
        "styles": {
            "fontSize": 90,
            "fontWeight": 700,
            "fontFamily": "monospace",
            "color": "#e8e8e8",
            "background": "#000000",
            "filter": "contrast(1.4)"
        },
        "animations": {
            "entrance": {
                "duration": 0.5,
                "ease": "steps(4)",
                "stagger": { "each": 0.03, "from": "random" },
                "keyframes": [ { "opacity": 0, "x": -20, "skewX": 30 } ]
            },
            "loop": {
                "duration": 0.3,
                "ease": "steps(3)",
                "repeat": -1,
                "repeatDelay": 1.2,
                "keyframes": [
                    { "x": 3, "skewX": -8 },
                    { "x": -3, "hueRotate": 90 },
                    { "x": 0, "skewX": 0, "hueRotate": 0 }
                ]
            },
            "exit": {
                "duration": 0.4,
                "ease": "steps(4)",
                "stagger": { "each": 0.02, "from": "random" },
                "keyframes": [ { "opacity": 0, "x": 20, "skewX": -30 } ]
            }
        }
    })
}

fn morph() -> Value {
    json!({
        "name": "morph",
        "description": "Variable-font weight breathing from hairline to black",
        "styles": {
            "fontSize": 100,
            "fontWeight": 100,
            "color": "#f5f5f5",
            "background": "#1b1b1f",
            "fontVariationSettings": "'wght' 100"
        },
        "animations": {
            "entrance": {
                "duration": 1.0,
                "ease": "power3.out",
                "stagger": 0.05,
                "keyframes": [ { "opacity": 0, "weight": 100, "scale": 0.9 } ]
            },
            "loop": {
                "duration": 2.0,
                "ease": "sine.inOut",
                "repeat": -1,
                "yoyo": true,
                "stagger": { "each": 0.08, "from": "center" },
                "keyframes": [ { "weight": 900 } ]
            },
            "exit": {
                "duration": 0.8,
                "ease": "power2.in",
                "stagger": { "each": 0.05, "from": "edges" },
                "keyframes": [ { "opacity": 0, "weight": 100 } ]
            }
        }
    })
}

fn minimal() -> Value {
    json!({
        "name": "minimal",
        "description": "Quiet fade and lift, no idle motion",
        "styles": {
            "fontSize": 64,
            "fontWeight": 400,
            "color": "#111111",
            "background": "#fafafa"
        },
        "animations": {
            "entrance": {
                "duration": 0.6,
                "ease": "power1.out",
                "stagger": 0.02,
                "keyframes": [ { "opacity": 0, "y": 10 } ]
            },
            "exit": {
                "duration": 0.4,
                "ease": "power1.in",
                "keyframes": [ { "opacity": 0 } ]
            }
        }
    })
}

fn typewriter() -> Value {
    json!({
        "name": "typewriter",
        "description": "Characters typed one at a time, then erased from the end",
        "styles": {
            "fontSize": 56,
            "fontWeight": 400,
            "fontFamily": "monospace",
            "color": "#33ff66",
            "background": "#0b0f0b"
        },
        "animations": {
            "entrance": { "typewriter": { "speed": 12 } },
            "loop": {
                "duration": 0.6,
                "ease": "steps(1)",
                "repeat": -1,
                "yoyo": true,
                "keyframes": [ { "brightness": 0.7 } ]
            },
            "exit": { "typewriter": { "speed": 20 } }
        }
    })
}

#[cfg(test)]
#[path = "../../tests/unit/preset/builtin.rs"]
mod tests;
