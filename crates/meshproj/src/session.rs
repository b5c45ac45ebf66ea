//! Invoke/execute lifecycle of a projection.
//!
//! [`ProjectionSession::invoke`] validates the selection, builds the target
//! hierarchy, casts one ray per source vertex and resolves fallbacks. The
//! hierarchy is dropped before `invoke` returns; only the per-vertex hit
//! data survives in the session. [`ProjectionSession::execute`] turns that
//! data into final positions, and when only the depth offset changed since
//! the last execute it just translates the previous result.

use std::time::Instant;

use meshproj_align::{largest_object, AlignMode, AlignSelection, AlignSettings, Camera};
use meshproj_math::{Point3, Transform, Vec3};
use tracing::{debug, info, warn};

use crate::{
    build_target, resolve_depth_axis, resolve_fallbacks, MeshHandle, ProjectionAlignment,
    ProjectionError, ProjectionSettings, Report, Result, VertexRecord, VertexStatus,
};

/// State captured at invoke and threaded through every later step.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// View the rays are cast from.
    pub camera: Camera,
    /// Settings of the run. Only `depth_offset` may change after invoke.
    pub settings: ProjectionSettings,
    /// Depth offset used by the last execute.
    pub last_depth_offset: f64,
}

/// Which branch an execute took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutePath {
    /// Positions rebuilt from the cached hit data.
    Full,
    /// Only the depth offset changed; previous result translated.
    DepthOnly,
}

/// Projection result of one source object.
#[derive(Debug, Clone)]
pub struct ObjectOutcome {
    /// Index of the object in the slice given to invoke.
    pub index: usize,
    /// Object name.
    pub name: String,
    /// New world positions, `None` when no vertex was projected and the
    /// object must be left untouched.
    pub positions: Option<Vec<Point3>>,
    /// Per-vertex status.
    pub statuses: Vec<VertexStatus>,
}

impl ObjectOutcome {
    fn count(&self, status: VertexStatus) -> usize {
        self.statuses.iter().filter(|&&s| s == status).count()
    }

    /// Vertices hit directly.
    pub fn hit_count(&self) -> usize {
        self.count(VertexStatus::Hit)
    }

    /// Vertices placed through a neighbor.
    pub fn fallback_count(&self) -> usize {
        self.count(VertexStatus::Fallback)
    }

    /// Vertices left in place.
    pub fn missed_count(&self) -> usize {
        self.count(VertexStatus::Missed)
    }

    /// Indices of fallback vertices.
    pub fn fallback_vertices(&self) -> Vec<usize> {
        self.statuses
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == VertexStatus::Fallback)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Result of one execute.
#[derive(Debug, Clone)]
pub struct ProjectionOutcome {
    /// Branch taken.
    pub path: ExecutePath,
    /// One entry per source object.
    pub objects: Vec<ObjectOutcome>,
    /// Messages for the user.
    pub reports: Vec<Report>,
}

impl ProjectionOutcome {
    /// Write projected positions into `objects` and select fallback
    /// vertices. Objects without projected vertices are not touched.
    ///
    /// Returns the number of objects written.
    pub fn apply_to<M: MeshHandle>(&self, objects: &mut [M]) -> usize {
        let mut written = 0;
        for outcome in &self.objects {
            let (Some(positions), Some(object)) =
                (&outcome.positions, objects.get_mut(outcome.index))
            else {
                continue;
            };
            object.set_world_positions(positions);
            object.select_vertices(&outcome.fallback_vertices());
            written += 1;
        }
        written
    }
}

/// Cast data of one source object.
#[derive(Debug, Clone)]
struct ObjectRun {
    index: usize,
    name: String,
    records: Vec<VertexRecord>,
}

/// One projection operation, from invoke to the last execute.
#[derive(Debug, Clone)]
pub struct ProjectionSession {
    context: RunContext,
    runs: Vec<ObjectRun>,
    min_offset: f64,
    /// Positions before the depth offset, cached by the last full execute.
    base: Option<Vec<Vec<Point3>>>,
    pending: Vec<Report>,
}

impl ProjectionSession {
    /// Gather everything a projection needs.
    ///
    /// `target` indexes the surface object in `objects`; every other object
    /// with vertices is a source. Nothing is written to `objects`.
    pub fn invoke<M: MeshHandle>(
        objects: &[M],
        target: Option<usize>,
        camera: Camera,
        settings: ProjectionSettings,
    ) -> Result<Self> {
        let start = Instant::now();
        settings.validate()?;

        let target_index = target.ok_or(ProjectionError::NoTarget)?;
        let target_object = objects.get(target_index).ok_or(ProjectionError::NoTarget)?;
        let sources: Vec<usize> = (0..objects.len())
            .filter(|&i| i != target_index && objects[i].vertex_count() > 0)
            .collect();
        if sources.is_empty() {
            return Err(ProjectionError::NoSources);
        }

        let bvh = build_target(target_object, settings.bias)?;
        info!(
            target = target_object.name(),
            sources = sources.len(),
            triangles = bvh.triangle_count(),
            "invoking projection"
        );

        let aligned: Vec<Transform> = sources
            .iter()
            .map(|&i| {
                aligned_transform(settings.alignment, &objects[i].world_transform(), &camera)
            })
            .collect();

        let source_refs: Vec<&M> = sources.iter().map(|&i| &objects[i]).collect();
        let parent = largest_object(&source_refs, settings.largest_by).unwrap_or(0);
        let (_, parent_rotation, _) = aligned[parent].decompose();
        let depth_axis = resolve_depth_axis(settings.depth_axis, &parent_rotation, &camera);
        debug!(
            parent = objects[sources[parent]].name(),
            axis = ?depth_axis,
            "resolved depth axis"
        );

        let mut runs = Vec::with_capacity(sources.len());
        for (&index, transform) in sources.iter().zip(&aligned) {
            let object = &objects[index];
            let mut records: Vec<VertexRecord> = object
                .positions()
                .iter()
                .zip(object.world_positions())
                .map(|(p, original)| {
                    let world = transform.apply_point(p);
                    let direction = camera.ray_direction(&world);
                    VertexRecord::cast(world, direction, depth_axis.dot(&world.coords), &bvh)
                        .with_original(original)
                })
                .collect();
            let recovered = resolve_fallbacks(object, &mut records, settings.bias);
            debug!(object = object.name(), recovered, "cast source vertices");
            runs.push(ObjectRun {
                index,
                name: object.name().to_string(),
                records,
            });
        }
        drop(bvh);

        let min_offset = runs
            .iter()
            .flat_map(|run| run.records.iter().map(|r| r.offset))
            .fold(f64::INFINITY, f64::min);

        let mut pending = Vec::new();
        if settings.report_timing {
            pending.push(Report::info(format!(
                "Invoke stage took {:.3} seconds",
                start.elapsed().as_secs_f64()
            )));
        }

        Ok(Self {
            context: RunContext {
                camera,
                last_depth_offset: settings.depth_offset,
                settings,
            },
            runs,
            min_offset,
            base: None,
            pending,
        })
    }

    /// The captured run context.
    pub fn context(&self) -> &RunContext {
        &self.context
    }

    /// Smallest depth value over every source vertex.
    pub fn min_offset(&self) -> f64 {
        self.min_offset
    }

    /// Change the depth offset for the next execute.
    pub fn set_depth_offset(&mut self, depth_offset: f64) -> Result<()> {
        if !depth_offset.is_finite() {
            return Err(ProjectionError::InvalidSettings(
                "depth_offset must be finite".into(),
            ));
        }
        self.context.settings.depth_offset = depth_offset;
        Ok(())
    }

    /// Compute final positions.
    pub fn execute(&mut self) -> ProjectionOutcome {
        let start = Instant::now();
        let mut reports = std::mem::take(&mut self.pending);

        let depth_offset = self.context.settings.depth_offset;
        let path = if self.base.is_some() && depth_offset != self.context.last_depth_offset {
            ExecutePath::DepthOnly
        } else {
            ExecutePath::Full
        };
        self.context.last_depth_offset = depth_offset;

        let base = match (path, self.base.take()) {
            (ExecutePath::DepthOnly, Some(base)) => base,
            _ => {
                reports.push(Report::info("Executing: mesh projection"));
                self.runs
                    .iter()
                    .map(|run| {
                        run.records
                            .iter()
                            .map(|r| r.base_position(self.min_offset))
                            .collect()
                    })
                    .collect()
            }
        };

        let translation: Vec3 = -self.context.camera.forward() * depth_offset;
        let objects = self
            .runs
            .iter()
            .zip(&base)
            .map(|(run, base)| object_outcome(run, base, &translation))
            .collect::<Vec<_>>();

        if path == ExecutePath::Full {
            for outcome in &objects {
                if let Some(report) = summarize(outcome) {
                    reports.push(report);
                }
            }
        }
        if self.context.settings.report_timing {
            reports.push(Report::info(format!(
                "Finished, project stage took {:.3} seconds",
                start.elapsed().as_secs_f64()
            )));
        }
        info!(?path, depth_offset, "executed projection");

        self.base = Some(base);
        ProjectionOutcome {
            path,
            objects,
            reports,
        }
    }
}

/// Invoke, execute once and write the result into `objects`.
pub fn project<M: MeshHandle>(
    objects: &mut [M],
    target: Option<usize>,
    camera: Camera,
    settings: ProjectionSettings,
) -> Result<ProjectionOutcome> {
    let mut session = ProjectionSession::invoke(objects, target, camera, settings)?;
    let outcome = session.execute();
    outcome.apply_to(objects);
    Ok(outcome)
}

/// World transform used for casting under `alignment`.
fn aligned_transform(
    alignment: ProjectionAlignment,
    world: &Transform,
    camera: &Camera,
) -> Transform {
    let mode = match alignment {
        ProjectionAlignment::AsIs => return world.clone(),
        ProjectionAlignment::AxisAligned => AlignMode::Closest,
        ProjectionAlignment::ZIsUp => AlignMode::Z,
    };
    AlignSelection::new(AlignSettings {
        mode,
        ..Default::default()
    })
    .parent_orientation(world, camera)
}

fn object_outcome(run: &ObjectRun, base: &[Point3], translation: &Vec3) -> ObjectOutcome {
    let statuses: Vec<VertexStatus> = run.records.iter().map(|r| r.status).collect();
    let any_projected = run.records.iter().any(VertexRecord::is_projected);
    let positions = any_projected.then(|| {
        base.iter()
            .zip(&run.records)
            .map(|(p, r)| if r.is_projected() { p + translation } else { *p })
            .collect()
    });
    ObjectOutcome {
        index: run.index,
        name: run.name.clone(),
        positions,
        statuses,
    }
}

fn summarize(outcome: &ObjectOutcome) -> Option<Report> {
    let missed = outcome.missed_count();
    let fallback = outcome.fallback_count();
    if outcome.positions.is_none() {
        warn!(object = %outcome.name, "no vertices projected");
        return Some(Report::warning(format!(
            "Mesh {} had no vertices projected onto the target. \
             Validate that the mesh is covered by the target",
            outcome.name
        )));
    }
    if missed == 0 && fallback == 0 {
        return None;
    }
    warn!(object = %outcome.name, missed, fallback, "partial projection");
    Some(Report::warning(format!(
        "Mesh {} has {missed} vertices that did not project and {fallback} placed \
         from a neighbor. Validate that the mesh is covered by the target",
        outcome.name
    )))
}
