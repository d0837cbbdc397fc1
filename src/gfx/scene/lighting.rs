//! Fixed three-light rig shared by every viewport: a soft ambient fill plus a
//! white key light and a cool blue rim light.

/// Unpacks a `0xRRGGBB` colour into float RGB, without gamma conversion
pub fn rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

/// Light arriving from `position` towards the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: [f32; 3],
    pub intensity: f32,
    pub position: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub ambient: AmbientLight,
    pub key: DirectionalLight,
    pub fill: DirectionalLight,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: AmbientLight {
                color: rgb(0xE1EBFF),
                intensity: 0.7,
            },
            key: DirectionalLight {
                color: rgb(0xFFFFFF),
                intensity: 0.9,
                position: [3.0, 3.0, 5.0],
            },
            fill: DirectionalLight {
                color: rgb(0x8CB4FF),
                intensity: 0.4,
                position: [-2.0, -1.0, 3.0],
            },
        }
    }
}
