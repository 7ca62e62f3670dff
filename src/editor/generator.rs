// src/editor/generator.rs

use crate::config::EditorSettings;
use crate::scene::{object_ref, ObjectRef, Prop};
use glam::Vec3;
use rand::Rng;

/// Scatters props at random positions inside a cube centred on the origin.
#[derive(Debug, Clone)]
pub struct SceneGenerator {
    /// Half the edge length of the cube.
    pub extent: f32,
    pub count: usize,
}

impl SceneGenerator {
    pub fn new(extent: f32, count: usize) -> Self {
        SceneGenerator {
            extent: extent.abs(),
            count,
        }
    }

    pub fn from_settings(settings: &EditorSettings) -> Self {
        Self::new(settings.generator_extent, settings.generator_count)
    }

    /// Props named `prop_<first_index>`, `prop_<first_index + 1>`, ...
    pub fn generate_props(&self, first_index: usize) -> Vec<ObjectRef> {
        self.generate_props_with(&mut rand::rng(), first_index)
    }

    pub fn generate_props_with<R: Rng>(&self, rng: &mut R, first_index: usize) -> Vec<ObjectRef> {
        let e = self.extent;
        (first_index..first_index + self.count)
            .map(|i| {
                let position = Vec3::new(
                    rng.random_range(-e..=e),
                    rng.random_range(-e..=e),
                    rng.random_range(-e..=e),
                );
                object_ref(Prop::new(format!("prop_{}", i), position))
            })
            .collect()
    }
}

impl Default for SceneGenerator {
    fn default() -> Self {
        Self::from_settings(&EditorSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::EditableObject;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_props_stay_inside_extent() {
        let generator = SceneGenerator::new(-4.0, 16);
        let mut rng = StdRng::seed_from_u64(7);
        let props = generator.generate_props_with(&mut rng, 3);
        assert_eq!(props.len(), 16);
        assert_eq!(props[0].read().name(), "prop_3");
        for prop in &props {
            let position = prop.read().transform().unwrap().position;
            assert!(position.abs().max_element() <= 4.0);
        }
    }

    #[test]
    fn test_seeded_generation_is_repeatable() {
        let generator = SceneGenerator::new(10.0, 4);
        let a = generator.generate_props_with(&mut StdRng::seed_from_u64(1), 0);
        let b = generator.generate_props_with(&mut StdRng::seed_from_u64(1), 0);
        for (a, b) in a.iter().zip(&b) {
            assert_eq!(a.read().transform(), b.read().transform());
        }
    }
}
