//! Whitted-style shading: direct lighting with shadow rays plus recursive
//! mirror reflection.

use lumen_core::{Color, Light, LightSample, Scene, SceneSettings};
use lumen_math::{Ray, Vec3};
use serde::{Deserialize, Serialize};

use crate::{Intersection, PartitionTree};

/// Replaces the shaded color of primary hits with a diagnostic value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DebugMode {
    /// Sum of `max(0, N.L)` over all lights, as grey
    DiffuseIntensity,
    /// Sum of the Blinn-Phong highlight terms over all lights, as grey
    SpecularIntensity,
    /// Surface normal mapped into [0, 1]
    Normal,
    /// Fraction of lights visible from the hit point, as grey
    Shadow,
    /// White wherever a camera ray hits anything
    PrimaryIntersection,
}

/// Feature toggles and numeric tolerances for shading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadingConfig {
    pub diffuse_lighting: bool,
    pub specular_lighting: bool,
    pub shadows: bool,
    pub reflections: bool,
    pub debug: Option<DebugMode>,
    /// Offset along the normal for shadow ray origins
    pub shadow_bias: f32,
    /// Offset along the normal for reflected ray origins
    pub reflection_bias: f32,
}

impl Default for ShadingConfig {
    fn default() -> Self {
        Self {
            diffuse_lighting: true,
            specular_lighting: true,
            shadows: true,
            reflections: true,
            debug: None,
            shadow_bias: 1e-3,
            reflection_bias: 1e-3,
        }
    }
}

impl ShadingConfig {
    pub fn with_debug(mut self, mode: DebugMode) -> Self {
        self.debug = Some(mode);
        self
    }

    pub fn with_reflections(mut self, enabled: bool) -> Self {
        self.reflections = enabled;
        self
    }

    pub fn with_shadows(mut self, enabled: bool) -> Self {
        self.shadows = enabled;
        self
    }
}

/// Color seen along a camera ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceResult {
    pub color: Color,
    /// Number of nested trace calls made, 1 for a camera ray alone
    pub depth: u32,
}

/// Shades rays against a built partition tree.
///
/// Holds only shared references, so one shader serves every render thread.
pub struct Shader<'a> {
    tree: &'a PartitionTree,
    lights: &'a [Light],
    settings: &'a SceneSettings,
    config: &'a ShadingConfig,
    use_partition: bool,
}

impl<'a> Shader<'a> {
    pub fn new(tree: &'a PartitionTree, scene: &'a Scene, config: &'a ShadingConfig) -> Self {
        Self {
            tree,
            lights: scene.lights(),
            settings: scene.settings(),
            config,
            use_partition: true,
        }
    }

    /// Resolve visibility with the brute-force scan instead of the tree.
    pub fn with_partition(mut self, enabled: bool) -> Self {
        self.use_partition = enabled;
        self
    }

    fn max_depth(&self) -> u32 {
        self.settings.max_depth.max(1)
    }

    fn nearest(&self, ray: &Ray) -> Option<Intersection<'a>> {
        if self.use_partition {
            self.tree.find_nearest(ray)
        } else {
            self.tree.find_nearest_linear(ray)
        }
    }

    /// Trace a camera ray. Misses return the scene background.
    pub fn trace(&self, ray: &Ray) -> TraceResult {
        if let Some(mode) = self.config.debug {
            let color = match self.nearest(ray) {
                Some(hit) => self.debug_color(mode, ray, &hit),
                None => self.settings.background,
            };
            return TraceResult { color, depth: 1 };
        }

        let mut depth = 0;
        let color = self
            .trace_recursive(ray, 0, &mut depth)
            .unwrap_or(self.settings.background);

        TraceResult { color, depth }
    }

    /// Shade one ray at recursion level `depth` (0 for camera rays).
    ///
    /// Returns `None` when the ray hits nothing; `deepest` records the
    /// largest number of nested calls reached.
    fn trace_recursive(&self, ray: &Ray, depth: u32, deepest: &mut u32) -> Option<Color> {
        *deepest = (*deepest).max(depth + 1);
        let hit = self.nearest(ray)?;
        let material = hit.material;

        let mut color = material.ambient + material.emission;
        let view = -ray.direction;

        for light in self.lights {
            let sample = light.sample(hit.point);
            if self.config.shadows && self.is_occluded(&hit, &sample) {
                continue;
            }

            let attenuation = light.attenuation(sample.distance, self.settings.attenuation);
            let radiance = light.color * attenuation;

            if self.config.diffuse_lighting {
                let lambert = hit.normal.dot(sample.direction).max(0.0);
                color += material.diffuse * radiance * lambert;
            }

            if self.config.specular_lighting {
                color += material.specular * radiance * blinn_phong(hit.normal, sample.direction, view, material.shininess);
            }
        }

        if self.config.reflections && depth + 1 < self.max_depth() && material.is_reflective() {
            let direction = reflect(ray.direction, hit.normal);
            let origin = hit.point + hit.normal * self.config.reflection_bias;
            let reflected = Ray::new(origin, direction);

            if let Some(reflection) = self.trace_recursive(&reflected, depth + 1, deepest) {
                color += material.specular * reflection;
            }
        }

        Some(color)
    }

    /// True when something lies between the hit point and the light.
    fn is_occluded(&self, hit: &Intersection, sample: &LightSample) -> bool {
        let origin = hit.point + hit.normal * self.config.shadow_bias;
        let shadow_ray = Ray::new(origin, sample.direction);

        self.nearest(&shadow_ray)
            .is_some_and(|blocker| blocker.distance < sample.distance)
    }

    fn debug_color(&self, mode: DebugMode, ray: &Ray, hit: &Intersection) -> Color {
        match mode {
            DebugMode::DiffuseIntensity => {
                let total: f32 = self
                    .lights
                    .iter()
                    .map(|light| hit.normal.dot(light.sample(hit.point).direction).max(0.0))
                    .sum();
                Color::splat(total)
            }
            DebugMode::SpecularIntensity => {
                let view = -ray.direction;
                let total: f32 = self
                    .lights
                    .iter()
                    .map(|light| {
                        let l = light.sample(hit.point).direction;
                        blinn_phong(hit.normal, l, view, hit.material.shininess)
                    })
                    .sum();
                Color::splat(total)
            }
            DebugMode::Normal => Color::from_vec3(hit.normal * 0.5 + Vec3::splat(0.5)),
            DebugMode::Shadow => {
                if self.lights.is_empty() {
                    return Color::WHITE;
                }
                let visible = self
                    .lights
                    .iter()
                    .filter(|light| !self.is_occluded(hit, &light.sample(hit.point)))
                    .count();
                Color::splat(visible as f32 / self.lights.len() as f32)
            }
            DebugMode::PrimaryIntersection => Color::WHITE,
        }
    }
}

/// Mirror `direction` about the plane with unit normal `normal`.
pub fn reflect(direction: Vec3, normal: Vec3) -> Vec3 {
    direction - 2.0 * direction.dot(normal) * normal
}

/// Blinn-Phong highlight `max(0, N.H)^shininess` with `H = normalize(L + V)`.
fn blinn_phong(normal: Vec3, to_light: Vec3, view: Vec3, shininess: f32) -> f32 {
    let half = (to_light + view).normalize_or_zero();
    normal.dot(half).max(0.0).powf(shininess)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::{Camera, Material, Primitive, SceneBuilder};

    fn scene_with(primitives: Vec<Primitive>, lights: Vec<Light>, max_depth: u32) -> Scene {
        let mut builder = SceneBuilder::new();
        builder
            .size(8, 8)
            .camera(Camera::default())
            .max_depth(max_depth)
            .background(Color::new(0.1, 0.2, 0.3));
        for p in primitives {
            builder.primitive(p);
        }
        for l in lights {
            builder.light(l);
        }
        builder.build().unwrap()
    }

    fn red_sphere_scene() -> Scene {
        let material = Material {
            diffuse: Color::new(1.0, 0.0, 0.0),
            ambient: Color::splat(0.1),
            ..Default::default()
        };
        scene_with(
            vec![Primitive::sphere(Vec3::new(0.0, 0.0, -5.0), 1.0, material)],
            vec![Light::directional(Vec3::new(0.0, 0.0, 1.0), Color::WHITE)],
            5,
        )
    }

    #[test]
    fn test_reflect() {
        let r = reflect(Vec3::new(1.0, -1.0, 0.0), Vec3::Y);
        assert_eq!(r, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_direct_lighting() {
        let scene = red_sphere_scene();
        let tree = PartitionTree::from_scene(&scene, Default::default());
        let config = ShadingConfig::default();
        let shader = Shader::new(&tree, &scene, &config);

        let result = shader.trace(&Ray::new(Vec3::ZERO, Vec3::NEG_Z));
        // ambient 0.1 + diffuse 1.0 * N.L 1.0
        assert!((result.color.r - 1.1).abs() < 1e-3);
        assert!((result.color.g - 0.1).abs() < 1e-3);
        assert_eq!(result.depth, 1);
    }

    #[test]
    fn test_miss_returns_background() {
        let scene = red_sphere_scene();
        let tree = PartitionTree::from_scene(&scene, Default::default());
        let config = ShadingConfig::default();
        let shader = Shader::new(&tree, &scene, &config);

        let result = shader.trace(&Ray::new(Vec3::ZERO, Vec3::Z));
        assert_eq!(result.color, Color::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_toggles() {
        let scene = red_sphere_scene();
        let tree = PartitionTree::from_scene(&scene, Default::default());
        let config = ShadingConfig {
            diffuse_lighting: false,
            ..Default::default()
        };
        let shader = Shader::new(&tree, &scene, &config);

        let result = shader.trace(&Ray::new(Vec3::ZERO, Vec3::NEG_Z));
        assert!((result.color.r - 0.1).abs() < 1e-4);
    }

    #[test]
    fn test_shadow_occludes_light() {
        // Small sphere between the lit sphere and the light at the origin
        let lit = Material::diffuse(Color::WHITE);
        let blocker = Primitive::sphere(Vec3::new(0.0, 0.0, -2.5), 0.5, Material::default());
        let scene = scene_with(
            vec![Primitive::sphere(Vec3::new(0.0, 0.0, -5.0), 1.0, lit), blocker],
            vec![Light::point(Vec3::ZERO, Color::WHITE)],
            1,
        );
        let tree = PartitionTree::from_scene(&scene, Default::default());

        // Comes in from the side and lands on (0, 0, -4), facing the light
        let ray = Ray::new(Vec3::new(1.0, 0.0, -3.0), Vec3::new(-1.0, 0.0, -1.0));

        let config = ShadingConfig::default().with_shadows(false);
        let unshadowed = Shader::new(&tree, &scene, &config).trace(&ray).color;
        assert!((unshadowed.r - 1.0).abs() < 1e-3);

        let config = ShadingConfig::default();
        let shadowed = Shader::new(&tree, &scene, &config).trace(&ray).color;
        assert_eq!(shadowed, Color::BLACK);
    }

    #[test]
    fn test_reflection_depth_bound() {
        let mirror = Material {
            specular: Color::splat(0.9),
            ambient: Color::BLACK,
            ..Default::default()
        };
        // Two facing mirror spheres, camera ray bouncing between them
        let primitives = vec![
            Primitive::sphere(Vec3::new(0.0, 0.0, -3.0), 1.0, mirror),
            Primitive::sphere(Vec3::new(0.0, 0.0, 3.0), 1.0, mirror),
        ];

        for max_depth in [1, 2, 5, 9] {
            let scene = scene_with(primitives.clone(), Vec::new(), max_depth);
            let tree = PartitionTree::from_scene(&scene, Default::default());
            let config = ShadingConfig::default();
            let result = Shader::new(&tree, &scene, &config).trace(&Ray::new(Vec3::ZERO, Vec3::NEG_Z));
            assert_eq!(result.depth, max_depth);

            let config = ShadingConfig::default().with_reflections(false);
            let result = Shader::new(&tree, &scene, &config).trace(&Ray::new(Vec3::ZERO, Vec3::NEG_Z));
            assert_eq!(result.depth, 1);
        }

        // Zero depth behaves like one
        let scene = scene_with(primitives, Vec::new(), 0);
        let tree = PartitionTree::from_scene(&scene, Default::default());
        let config = ShadingConfig::default();
        let result = Shader::new(&tree, &scene, &config).trace(&Ray::new(Vec3::ZERO, Vec3::NEG_Z));
        assert_eq!(result.depth, 1);
    }

    #[test]
    fn test_reflected_miss_is_black() {
        let mirror = Material {
            specular: Color::WHITE,
            ambient: Color::BLACK,
            ..Default::default()
        };
        let scene = scene_with(
            vec![Primitive::sphere(Vec3::new(0.0, 0.0, -3.0), 1.0, mirror)],
            Vec::new(),
            5,
        );
        let tree = PartitionTree::from_scene(&scene, Default::default());
        let config = ShadingConfig::default();
        let result = Shader::new(&tree, &scene, &config).trace(&Ray::new(Vec3::ZERO, Vec3::NEG_Z));

        // Reflected ray escapes; background is not added
        assert_eq!(result.color, Color::BLACK);
        assert_eq!(result.depth, 2);
    }

    #[test]
    fn test_debug_modes() {
        let scene = red_sphere_scene();
        let tree = PartitionTree::from_scene(&scene, Default::default());
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

        let trace = |mode: DebugMode, ray: &Ray| {
            let config = ShadingConfig::default().with_debug(mode);
            Shader::new(&tree, &scene, &config).trace(ray).color
        };

        assert_eq!(trace(DebugMode::PrimaryIntersection, &ray), Color::WHITE);
        assert!((trace(DebugMode::DiffuseIntensity, &ray).r - 1.0).abs() < 1e-4);
        assert!((trace(DebugMode::Shadow, &ray).g - 1.0).abs() < 1e-4);

        // Light and viewer both along the normal: N.H = 1
        assert!((trace(DebugMode::SpecularIntensity, &ray).r - 1.0).abs() < 1e-4);

        let normal = trace(DebugMode::Normal, &ray);
        assert!((normal.b - 1.0).abs() < 1e-4);
        assert!((normal.r - 0.5).abs() < 1e-4);

        // Misses keep the background
        let miss = Ray::new(Vec3::ZERO, Vec3::Z);
        assert_eq!(trace(DebugMode::Normal, &miss), Color::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_specular_intensity_off_axis() {
        let material = Material {
            specular: Color::WHITE,
            shininess: 10.0,
            ..Default::default()
        };
        // Light 45 degrees off the normal, so the half vector sits at 22.5
        let scene = scene_with(
            vec![Primitive::sphere(Vec3::new(0.0, 0.0, -5.0), 1.0, material)],
            vec![Light::directional(Vec3::new(1.0, 0.0, 1.0), Color::WHITE)],
            5,
        );
        let tree = PartitionTree::from_scene(&scene, Default::default());
        let config = ShadingConfig::default().with_debug(DebugMode::SpecularIntensity);
        let color = Shader::new(&tree, &scene, &config)
            .trace(&Ray::new(Vec3::ZERO, Vec3::NEG_Z))
            .color;

        let expected = 22.5f32.to_radians().cos().powf(10.0);
        assert!((color.r - expected).abs() < 1e-3);
        assert_eq!(color.r, color.g);
    }

    #[test]
    fn test_shadow_debug_behind_blocker() {
        let blocker = Primitive::sphere(Vec3::new(0.0, 0.0, -2.5), 0.5, Material::default());
        let scene = scene_with(
            vec![Primitive::sphere(Vec3::new(0.0, 0.0, -5.0), 1.0, Material::default()), blocker],
            vec![Light::point(Vec3::ZERO, Color::WHITE)],
            1,
        );
        let tree = PartitionTree::from_scene(&scene, Default::default());
        let config = ShadingConfig::default().with_debug(DebugMode::Shadow);
        let shader = Shader::new(&tree, &scene, &config);

        // Lands on (0, 0, -4), whose path to the light crosses the blocker
        let hidden = shader.trace(&Ray::new(Vec3::new(1.0, 0.0, -3.0), Vec3::new(-1.0, 0.0, -1.0)));
        assert_eq!(hidden.color, Color::BLACK);

        // The blocker itself sees the light
        let visible = shader.trace(&Ray::new(Vec3::ZERO, Vec3::NEG_Z));
        assert_eq!(visible.color, Color::WHITE);
    }

    #[test]
    fn test_linear_scan_matches_tree() {
        let scene = red_sphere_scene();
        let tree = PartitionTree::from_scene(&scene, Default::default());
        let config = ShadingConfig::default();

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.1, 0.1, -1.0));
        let fast = Shader::new(&tree, &scene, &config).trace(&ray);
        let slow = Shader::new(&tree, &scene, &config).with_partition(false).trace(&ray);
        assert_eq!(fast, slow);
    }
}
