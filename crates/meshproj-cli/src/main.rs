//! meshproj CLI - project, align and mirror meshes in a JSON scene.
//!
//! Reads a scene file, runs one operation and writes the updated scene.
//! Log output is controlled with `RUST_LOG`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use meshproj::{DepthAxis, ProjectionAlignment, ProjectionSettings, Report};
use meshproj_align::{
    AlignMode, AlignSelection, AlignSettings, LargestBy, ParentRule, SceneObject,
};
use meshproj_math::{Plane, Point3, Vec3};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod scene;

use scene::Scene;

#[derive(Parser)]
#[command(name = "meshproj")]
#[command(about = "Project meshes onto a surface and align them to the view", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Project every object onto the active object
    Project {
        #[command(flatten)]
        io: SceneArgs,
        /// TOML settings file ([project] and [align] tables)
        #[arg(short, long)]
        settings: Option<PathBuf>,
        /// Source re-orientation before casting
        #[arg(long, value_enum)]
        alignment: Option<AlignmentArg>,
        /// Axis measuring relative depth
        #[arg(long, value_enum)]
        depth_axis: Option<DepthAxisArg>,
        /// Parent used for local depth axes
        #[arg(long, value_enum)]
        largest_by: Option<LargestByArg>,
        /// Move the result toward the camera
        #[arg(long, allow_hyphen_values = true)]
        depth_offset: Option<f64>,
        /// Intersection bias (0.0001 to 1)
        #[arg(long)]
        bias: Option<f64>,
        /// Report stage timings
        #[arg(long)]
        timing: bool,
    },
    /// Rotate the selection so one axis faces the view
    Align {
        #[command(flatten)]
        io: SceneArgs,
        /// TOML settings file ([project] and [align] tables)
        #[arg(short, long)]
        settings: Option<PathBuf>,
        /// Which parent axis faces the camera
        #[arg(long, value_enum)]
        mode: Option<AlignModeArg>,
        /// How the parent object is chosen
        #[arg(long, value_enum)]
        parent: Option<ParentArg>,
        /// Leave the active object out of the selection
        #[arg(long)]
        exclude_active: bool,
    },
    /// Mirror objects across a plane
    Mirror {
        #[command(flatten)]
        io: SceneArgs,
        #[command(flatten)]
        mirror: MirrorArgs,
    },
}

#[derive(Args)]
struct SceneArgs {
    /// Input scene (.json)
    input: PathBuf,
    /// Output scene (.json), defaults to the input
    output: Option<PathBuf>,
}

#[derive(Args)]
struct MirrorArgs {
    /// Plane normal as x,y,z
    #[arg(long, required = true, value_delimiter = ',', allow_hyphen_values = true)]
    normal: Vec<f64>,
    /// A point on the plane as x,y,z
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, default_value = "0,0,0")]
    point: Vec<f64>,
    /// Plane is given in the active object's local space
    #[arg(long)]
    local: bool,
    /// Mirror object transforms and leave vertex data untouched
    #[arg(long)]
    transform_only: bool,
    /// Objects to mirror (default: all but the active object)
    #[arg(short, long)]
    object: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum AlignmentArg {
    AsIs,
    AxisAligned,
    ZIsUp,
}

impl From<AlignmentArg> for ProjectionAlignment {
    fn from(arg: AlignmentArg) -> Self {
        match arg {
            AlignmentArg::AsIs => Self::AsIs,
            AlignmentArg::AxisAligned => Self::AxisAligned,
            AlignmentArg::ZIsUp => Self::ZIsUp,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DepthAxisArg {
    LocalX,
    LocalY,
    LocalZ,
    CameraForward,
    ClosestToCamera,
}

impl From<DepthAxisArg> for DepthAxis {
    fn from(arg: DepthAxisArg) -> Self {
        match arg {
            DepthAxisArg::LocalX => Self::LocalX,
            DepthAxisArg::LocalY => Self::LocalY,
            DepthAxisArg::LocalZ => Self::LocalZ,
            DepthAxisArg::CameraForward => Self::CameraForward,
            DepthAxisArg::ClosestToCamera => Self::ClosestToCamera,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum LargestByArg {
    Volume,
    VertexCount,
}

impl From<LargestByArg> for LargestBy {
    fn from(arg: LargestByArg) -> Self {
        match arg {
            LargestByArg::Volume => Self::Volume,
            LargestByArg::VertexCount => Self::VertexCount,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum AlignModeArg {
    Z,
    Y,
    X,
    AxisAligned,
    Closest,
}

impl From<AlignModeArg> for AlignMode {
    fn from(arg: AlignModeArg) -> Self {
        match arg {
            AlignModeArg::Z => Self::Z,
            AlignModeArg::Y => Self::Y,
            AlignModeArg::X => Self::X,
            AlignModeArg::AxisAligned => Self::AxisAligned,
            AlignModeArg::Closest => Self::Closest,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ParentArg {
    VertexCount,
    Volume,
    Active,
}

impl From<ParentArg> for ParentRule {
    fn from(arg: ParentArg) -> Self {
        match arg {
            ParentArg::VertexCount => Self::VertexCount,
            ParentArg::Volume => Self::Volume,
            ParentArg::Active => Self::Active,
        }
    }
}

/// Settings file layout.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SettingsFile {
    project: ProjectionSettings,
    align: AlignSettings,
}

fn load_settings(path: Option<&Path>) -> Result<SettingsFile> {
    let Some(path) = path else {
        return Ok(SettingsFile::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("invalid settings in {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Project {
            io,
            settings,
            alignment,
            depth_axis,
            largest_by,
            depth_offset,
            bias,
            timing,
        } => {
            let mut project = load_settings(settings.as_deref())?.project;
            if let Some(alignment) = alignment {
                project.alignment = alignment.into();
            }
            if let Some(depth_axis) = depth_axis {
                project.depth_axis = depth_axis.into();
            }
            if let Some(largest_by) = largest_by {
                project.largest_by = largest_by.into();
            }
            if let Some(depth_offset) = depth_offset {
                project.depth_offset = depth_offset;
            }
            if let Some(bias) = bias {
                project.bias = bias;
            }
            project.report_timing |= timing;
            run_project(&io, project)?;
        }
        Commands::Align {
            io,
            settings,
            mode,
            parent,
            exclude_active,
        } => {
            let mut align = load_settings(settings.as_deref())?.align;
            if let Some(mode) = mode {
                align.mode = mode.into();
            }
            if let Some(parent) = parent {
                align.parent = parent.into();
            }
            align.exclude_active |= exclude_active;
            run_align(&io, align)?;
        }
        Commands::Mirror { io, mirror } => {
            run_mirror(&io, &mirror)?;
        }
    }

    Ok(())
}

fn read_scene(io: &SceneArgs) -> Result<Scene> {
    let json = fs::read_to_string(&io.input)
        .with_context(|| format!("failed to read {}", io.input.display()))?;
    Scene::from_json(&json)
}

fn write_scene(io: &SceneArgs, scene: &Scene) -> Result<()> {
    let output = io.output.as_ref().unwrap_or(&io.input);
    fs::write(output, scene.to_json()?)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("Wrote {}", output.display());
    Ok(())
}

fn print_reports(reports: &[Report]) {
    for report in reports {
        eprintln!("{report}");
    }
}

fn run_project(io: &SceneArgs, settings: ProjectionSettings) -> Result<()> {
    let mut scene = read_scene(io)?;
    let target = scene.active_index()?;
    let mut meshes = scene.meshes()?;
    info!(objects = meshes.len(), ?target, "projecting scene");

    let outcome = match meshproj::project(&mut meshes, target, scene.camera(), settings) {
        Ok(outcome) => outcome,
        Err(err) => {
            print_reports(&[Report::from(&err)]);
            return Err(err.into());
        }
    };
    print_reports(&outcome.reports);
    for object in &outcome.objects {
        println!(
            "{}: {} hit, {} fallback, {} missed",
            object.name,
            object.hit_count(),
            object.fallback_count(),
            object.missed_count()
        );
    }

    scene.update_from(&meshes);
    write_scene(io, &scene)
}

fn run_align(io: &SceneArgs, settings: AlignSettings) -> Result<()> {
    let mut scene = read_scene(io)?;
    let active = scene.active_index()?;
    let mut meshes = scene.meshes()?;
    info!(objects = meshes.len(), ?active, mode = ?settings.mode, "aligning scene");

    let plan = AlignSelection::new(settings).apply(&meshes, active, &scene.camera())?;
    for (index, transform) in plan.transforms {
        meshes[index].set_transform(transform);
    }
    println!("Aligned to view around {}", scene.objects[plan.parent].name);

    scene.update_from(&meshes);
    write_scene(io, &scene)
}

fn run_mirror(io: &SceneArgs, args: &MirrorArgs) -> Result<()> {
    let (&[nx, ny, nz], &[px, py, pz]) = (&args.normal[..], &args.point[..]) else {
        bail!("normal and point need three components each");
    };
    let Some(normal) = Vec3::new(nx, ny, nz).try_normalize(1e-12) else {
        bail!("mirror plane normal must not be zero");
    };
    let mut plane = Plane::new(normal, &Point3::new(px, py, pz));

    let mut scene = read_scene(io)?;
    let active = scene.active_index()?;
    let mut meshes = scene.meshes()?;

    if args.local {
        let Some(active) = active else {
            bail!("--local needs an active object");
        };
        plane = plane.transformed(&meshes[active].world_transform());
    }
    for name in &args.object {
        if !scene.objects.iter().any(|o| &o.name == name) {
            bail!("object {name} not found");
        }
    }
    info!(
        normal = ?plane.normal,
        transform_only = args.transform_only,
        "mirroring objects"
    );
    let mut mirrored = 0;
    for (index, mesh) in meshes.iter_mut().enumerate() {
        let chosen = if args.object.is_empty() {
            Some(index) != active
        } else {
            args.object.contains(&scene.objects[index].name)
        };
        if !chosen {
            continue;
        }
        if args.transform_only {
            mesh.mirror_transform(&plane);
        } else {
            mesh.mirror(&plane);
        }
        mirrored += 1;
    }
    println!("Mirrored {mirrored} objects");

    scene.update_from(&meshes);
    write_scene(io, &scene)
}
