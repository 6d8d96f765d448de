//! Scene file loading.
//!
//! Scene files are line oriented: one command per line, arguments separated
//! by whitespace. Blank lines and lines starting with `#` are ignored.
//!
//! # Supported Commands
//!
//! - `size w h`, `maxdepth n`, `output file`, `background r g b`
//! - `camera ex ey ez cx cy cz ux uy uz fovy`
//! - `directional x y z r g b`, `point x y z r g b`, `attenuation c0 c1 c2`
//! - `ambient r g b`, `diffuse r g b`, `specular r g b`, `emission r g b`, `shininess s`
//! - `maxverts n`, `maxvertnorms n`, `vertex x y z`, `vertexnormal x y z nx ny nz`
//! - `tri i j k`, `trinormal i j k`, `sphere x y z r`
//! - `translate x y z`, `rotate ax ay az degrees`, `scale x y z`
//! - `pushTransform`, `popTransform`
//!
//! Transform commands multiply onto the left of the current stack top, so
//! they apply to geometry in the order they appear in the file. Unknown
//! commands are skipped with a warning.

use std::path::Path;
use std::str::FromStr;

use lumen_math::{Mat4, Vec3, Vec4};
use thiserror::Error;

use crate::primitive::is_degenerate_triangle;
use crate::scene::{Scene, SceneBuilder};
use crate::{Camera, Color, Light, Material, Primitive};

/// Upper bound on storage reserved up front for `maxverts`/`maxvertnorms`.
///
/// The counts are only hints; pools still grow past this as vertices arrive.
const MAX_RESERVE: usize = 1 << 20;

/// Errors that can occur while loading a scene.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Line {line}: vertex index {index} out of range ({count} defined)")]
    VertexIndex { line: usize, index: usize, count: usize },

    #[error("Line {line}: popTransform on an empty transform stack")]
    EmptyTransformStack { line: usize },

    #[error("Line {line}: sphere radius must be positive, got {radius}")]
    InvalidRadius { line: usize, radius: f32 },

    #[error("Line {line}: degenerate triangle")]
    DegenerateTriangle { line: usize },

    #[error("Line {line}: invalid light")]
    InvalidLight { line: usize },

    #[error("Invalid attenuation coefficients {0}")]
    InvalidAttenuation(Vec3),

    #[error("Invalid image size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    #[error("Camera eye, target and up vector do not form a valid view")]
    InvalidCamera,

    #[error("Primitive {0} has degenerate geometry or a singular transform")]
    InvalidPrimitive(usize),

    #[error("Missing required command: {0}")]
    MissingCommand(&'static str),
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Load a scene file from disk.
pub fn load_scene<P: AsRef<Path>>(path: P) -> LoadResult<Scene> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let scene = load_scene_from_string(&content)?;

    log::info!(
        "Loaded {}: {} spheres, {} triangles, {} lights",
        path.display(),
        scene.sphere_count(),
        scene.triangle_count(),
        scene.light_count()
    );
    let camera = scene.camera();
    log::debug!(
        "Camera at {} looking at {} (up {}, fovy {})",
        camera.eye(),
        camera.look_at(),
        camera.up(),
        camera.fovy()
    );

    Ok(scene)
}

/// Parse a scene from the contents of a scene file.
pub fn load_scene_from_string(content: &str) -> LoadResult<Scene> {
    let mut parser = SceneParser::new();
    for (index, line) in content.lines().enumerate() {
        parser.parse_line(index + 1, line)?;
    }
    parser.builder.build()
}

/// Parser state carried between lines.
struct SceneParser {
    builder: SceneBuilder,
    material: Material,
    transforms: Vec<Mat4>,
    vertices: Vec<Vec3>,
    /// `(position, normal)` pairs from `vertexnormal`
    vertex_normals: Vec<(Vec3, Vec3)>,
}

impl SceneParser {
    fn new() -> Self {
        Self {
            builder: SceneBuilder::new(),
            material: Material::default(),
            transforms: vec![Mat4::IDENTITY],
            vertices: Vec::new(),
            vertex_normals: Vec::new(),
        }
    }

    fn current_transform(&self) -> Mat4 {
        self.transforms.last().copied().unwrap_or(Mat4::IDENTITY)
    }

    fn apply_transform(&mut self, transform: Mat4) {
        if let Some(top) = self.transforms.last_mut() {
            *top = transform * *top;
        }
    }

    fn parse_line(&mut self, line: usize, text: &str) -> LoadResult<()> {
        let trimmed = text.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(());
        }

        let mut tokens = trimmed.split_whitespace();
        let command = tokens.next().unwrap_or_default();
        let args: Vec<&str> = tokens.collect();

        match command {
            "size" => {
                let [width, height] = parse_args::<u32, 2>(line, &args)?;
                self.builder.size(width, height);
            }
            "maxdepth" => {
                let [depth] = parse_args::<u32, 1>(line, &args)?;
                self.builder.max_depth(depth);
            }
            "output" => {
                let [file] = expect_args::<1>(line, &args)?;
                self.builder.output(file);
            }
            "background" => {
                let [r, g, b] = parse_args::<f32, 3>(line, &args)?;
                self.builder.background(Color::new(r, g, b));
            }
            "camera" => {
                let v = parse_args::<f32, 10>(line, &args)?;
                let camera = Camera::new(
                    Vec3::new(v[0], v[1], v[2]),
                    Vec3::new(v[3], v[4], v[5]),
                    Vec3::new(v[6], v[7], v[8]),
                    v[9],
                );
                if !camera.is_valid() {
                    return Err(parse_error(line, "camera eye, target and up vector are degenerate"));
                }
                self.builder.camera(camera);
            }
            "directional" | "point" => {
                let v = parse_args::<f32, 6>(line, &args)?;
                let w = if command == "point" { 1.0 } else { 0.0 };
                let location = Vec4::new(v[0], v[1], v[2], w);
                if !location.is_finite() || (w == 0.0 && location.truncate() == Vec3::ZERO) {
                    return Err(LoadError::InvalidLight { line });
                }
                self.builder.light(Light::from_homogeneous(location, Color::new(v[3], v[4], v[5])));
            }
            "attenuation" => {
                let [c0, c1, c2] = parse_args::<f32, 3>(line, &args)?;
                let coefficients = Vec3::new(c0, c1, c2);
                if !coefficients.is_finite() || coefficients.min_element() < 0.0 || coefficients.max_element() <= 0.0 {
                    return Err(LoadError::InvalidAttenuation(coefficients));
                }
                self.builder.attenuation(coefficients);
            }
            "ambient" => self.material.ambient = parse_color(line, &args)?,
            "diffuse" => self.material.diffuse = parse_color(line, &args)?,
            "specular" => self.material.specular = parse_color(line, &args)?,
            "emission" => self.material.emission = parse_color(line, &args)?,
            "shininess" => {
                let [s] = parse_args::<f32, 1>(line, &args)?;
                self.material.shininess = s;
            }
            "maxverts" => {
                let [n] = parse_args::<usize, 1>(line, &args)?;
                self.vertices.reserve(n.min(MAX_RESERVE));
            }
            "maxvertnorms" => {
                let [n] = parse_args::<usize, 1>(line, &args)?;
                self.vertex_normals.reserve(n.min(MAX_RESERVE));
            }
            "vertex" => {
                let [x, y, z] = parse_args::<f32, 3>(line, &args)?;
                self.vertices.push(Vec3::new(x, y, z));
            }
            "vertexnormal" => {
                let v = parse_args::<f32, 6>(line, &args)?;
                self.vertex_normals
                    .push((Vec3::new(v[0], v[1], v[2]), Vec3::new(v[3], v[4], v[5])));
            }
            "tri" => {
                let indices = parse_args::<usize, 3>(line, &args)?;
                let vertices = lookup(line, &self.vertices, indices)?;
                if is_degenerate_triangle(&vertices) {
                    return Err(LoadError::DegenerateTriangle { line });
                }
                let primitive = Primitive::triangle(vertices, self.material)
                    .with_transform(self.current_transform());
                self.builder.primitive(primitive);
            }
            "trinormal" => {
                let indices = parse_args::<usize, 3>(line, &args)?;
                let entries = lookup(line, &self.vertex_normals, indices)?;
                let vertices = entries.map(|(p, _)| p);
                let normals = entries.map(|(_, n)| n);
                if is_degenerate_triangle(&vertices) {
                    return Err(LoadError::DegenerateTriangle { line });
                }
                let primitive = Primitive::triangle_with_normals(vertices, normals, self.material)
                    .with_transform(self.current_transform());
                self.builder.primitive(primitive);
            }
            "sphere" => {
                let [x, y, z, radius] = parse_args::<f32, 4>(line, &args)?;
                if radius.is_nan() || radius <= 0.0 {
                    return Err(LoadError::InvalidRadius { line, radius });
                }
                let primitive = Primitive::sphere(Vec3::new(x, y, z), radius, self.material)
                    .with_transform(self.current_transform());
                self.builder.primitive(primitive);
            }
            "translate" => {
                let [x, y, z] = parse_args::<f32, 3>(line, &args)?;
                self.apply_transform(Mat4::from_translation(Vec3::new(x, y, z)));
            }
            "scale" => {
                let [x, y, z] = parse_args::<f32, 3>(line, &args)?;
                self.apply_transform(Mat4::from_scale(Vec3::new(x, y, z)));
            }
            "rotate" => {
                let [x, y, z, degrees] = parse_args::<f32, 4>(line, &args)?;
                let axis = Vec3::new(x, y, z).normalize_or_zero();
                if axis == Vec3::ZERO {
                    return Err(parse_error(line, "rotation axis must be non-zero"));
                }
                self.apply_transform(Mat4::from_axis_angle(axis, degrees.to_radians()));
            }
            "pushTransform" => {
                let top = self.current_transform();
                self.transforms.push(top);
            }
            "popTransform" => {
                if self.transforms.len() <= 1 {
                    return Err(LoadError::EmptyTransformStack { line });
                }
                self.transforms.pop();
            }
            other => {
                log::warn!("Line {}: unknown command '{}', skipping", line, other);
            }
        }

        Ok(())
    }
}

fn parse_error(line: usize, message: impl Into<String>) -> LoadError {
    LoadError::Parse {
        line,
        message: message.into(),
    }
}

fn expect_args<'a, const N: usize>(line: usize, args: &[&'a str]) -> LoadResult<[&'a str; N]> {
    <[&str; N]>::try_from(args)
        .map_err(|_| parse_error(line, format!("expected {} arguments, found {}", N, args.len())))
}

fn parse_args<T: FromStr + Copy + Default, const N: usize>(line: usize, args: &[&str]) -> LoadResult<[T; N]> {
    let tokens = expect_args::<N>(line, args)?;
    let mut values = [T::default(); N];
    for (value, token) in values.iter_mut().zip(tokens) {
        *value = token
            .parse()
            .map_err(|_| parse_error(line, format!("invalid number '{}'", token)))?;
    }
    Ok(values)
}

fn parse_color(line: usize, args: &[&str]) -> LoadResult<Color> {
    let [r, g, b] = parse_args::<f32, 3>(line, args)?;
    Ok(Color::new(r, g, b))
}

fn lookup<T: Copy>(line: usize, pool: &[T], indices: [usize; 3]) -> LoadResult<[T; 3]> {
    let fetch = |index: usize| {
        pool.get(index).copied().ok_or(LoadError::VertexIndex {
            line,
            index,
            count: pool.len(),
        })
    };
    Ok([fetch(indices[0])?, fetch(indices[1])?, fetch(indices[2])?])
}
