//! Wavefront-style OBJ parser producing raw attribute streams.
//!
//! Directives: `v`, `vt`, `vn`, `f`, `mtllib`, `usemtl`. Anything else
//! (comments included) is ignored. A malformed line is skipped with a
//! `warn!` and parsing continues; only stream I/O aborts the load.
//!
//! Faces are emitted as one [`VertexRef`] per corner in declaration order,
//! without triangulating n-gons. The index buffer downstream is a triangle
//! list, so only 3-corner faces render correctly; this matches the source
//! exporters this format targets and is pinned by tests.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use crate::error::{AssetError, AssetResult};
use crate::material::MaterialTable;
use crate::mesh::{MeshData, VertexRef};
use crate::mtl;

/// Parse result: geometry, merged material tables, and the last `usemtl`
/// name seen (a single current material; no per-face partitioning).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjModel {
    pub mesh: MeshData,
    pub materials: MaterialTable,
    pub active_material: Option<String>,
}

/// Load an OBJ file from disk. `mtllib` references resolve relative to the
/// file's parent directory.
pub fn load_obj_from_path(path: impl AsRef<Path>) -> AssetResult<ObjModel> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| AssetError::Resource {
        path: path.to_path_buf(),
        source,
    })?;
    parse_obj(BufReader::new(file), path, path.parent())
}

/// Load an OBJ document from a [`BufRead`] implementation. `mtllib` lines
/// cannot be resolved without a base directory and are skipped with a
/// diagnostic.
pub fn load_obj_from_reader<R: BufRead>(reader: R) -> AssetResult<ObjModel> {
    parse_obj(reader, Path::new("<reader>"), None)
}

/// Convenience helper to parse an OBJ string literal.
pub fn load_obj_from_str(contents: &str) -> AssetResult<ObjModel> {
    load_obj_from_reader(io::Cursor::new(contents))
}

fn parse_obj<R: BufRead>(reader: R, origin: &Path, base: Option<&Path>) -> AssetResult<ObjModel> {
    let mut model = ObjModel::default();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| AssetError::Resource {
            path: origin.to_path_buf(),
            source,
        })?;
        let mut tokens = line.split_whitespace();
        let Some(tag) = tokens.next() else {
            continue;
        };

        match tag {
            "v" => match parse_vec3(&mut tokens) {
                Some(p) => model.mesh.positions.push(p),
                None => warn_skipped(origin, line_no, "v"),
            },
            "vt" => match parse_vec2(&mut tokens) {
                Some(t) => model.mesh.texcoords.push(t),
                None => warn_skipped(origin, line_no, "vt"),
            },
            "vn" => match parse_vec3(&mut tokens) {
                Some(n) => model.mesh.normals.push(n),
                None => warn_skipped(origin, line_no, "vn"),
            },
            "f" => match parse_face(&mut tokens) {
                Some(refs) => model.mesh.triangles.extend(refs),
                None => warn_skipped(origin, line_no, "f"),
            },
            "mtllib" => {
                let Some(name) = tokens.next() else {
                    warn_skipped(origin, line_no, "mtllib");
                    continue;
                };
                load_material_library(&mut model.materials, name, base, origin, line_no);
            }
            "usemtl" => match tokens.next() {
                Some(name) => model.active_material = Some(name.to_owned()),
                None => warn_skipped(origin, line_no, "usemtl"),
            },
            // Comments, object/group/smoothing directives, anything unknown.
            _ => {}
        }
    }

    Ok(model)
}

/// An unreadable material library is fatal to the MTL load only; geometry
/// parsing continues without it.
fn load_material_library(
    materials: &mut MaterialTable,
    name: &str,
    base: Option<&Path>,
    origin: &Path,
    line_no: usize,
) {
    let Some(base) = base else {
        log::warn!(
            "{}:{}: no base directory to resolve mtllib {}, skipped",
            origin.display(),
            line_no + 1,
            name
        );
        return;
    };
    let path = base.join(name);
    match mtl::load_mtl_from_path(&path) {
        Ok(table) => {
            log::info!("loaded {} material(s) from {}", table.len(), path.display());
            materials.merge(table);
        }
        Err(err) => log::error!("material library load failed: {err}"),
    }
}

fn warn_skipped(origin: &Path, line_no: usize, tag: &str) {
    log::warn!(
        "{}:{}: malformed {} line, skipped",
        origin.display(),
        line_no + 1,
        tag
    );
}

fn parse_vec3<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Option<[f32; 3]> {
    let x = tokens.next()?.parse::<f32>().ok()?;
    let y = tokens.next()?.parse::<f32>().ok()?;
    let z = tokens.next()?.parse::<f32>().ok()?;
    Some([x, y, z])
}

fn parse_vec2<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Option<[f32; 2]> {
    let u = tokens.next()?.parse::<f32>().ok()?;
    let v = tokens.next()?.parse::<f32>().ok()?;
    Some([u, v])
}

/// Parse every `pos[/tex][/norm]` corner of a face line. Any malformed
/// corner invalidates the whole line so a partial face never reaches the
/// index stream.
fn parse_face<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Option<Vec<VertexRef>> {
    let mut refs = Vec::new();
    for token in tokens {
        refs.push(parse_vertex_ref(token)?);
    }
    if refs.is_empty() { None } else { Some(refs) }
}

/// Indices in the file are 1-based; a missing or empty tex/norm field is a
/// deliberate safe default of stream index 0. This format never uses
/// negative (relative) indices, so anything non-positive is malformed.
fn parse_vertex_ref(token: &str) -> Option<VertexRef> {
    let mut fields = token.split('/');
    let position = parse_index(fields.next()?)?;
    let texcoord = match fields.next() {
        Some(f) if !f.is_empty() => parse_index(f)?,
        _ => 0,
    };
    let normal = match fields.next() {
        Some(f) if !f.is_empty() => parse_index(f)?,
        _ => 0,
    };
    Some(VertexRef {
        position,
        texcoord,
        normal,
    })
}

fn parse_index(field: &str) -> Option<u32> {
    let raw = field.parse::<u32>().ok()?;
    if raw == 0 { None } else { Some(raw - 1) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vref(p: u32, t: u32, n: u32) -> VertexRef {
        VertexRef {
            position: p,
            texcoord: t,
            normal: n,
        }
    }

    #[test]
    fn round_trips_a_triangle() {
        let model = load_obj_from_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(
            model.mesh.positions,
            vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]
        );
        assert_eq!(
            model.mesh.triangles,
            vec![vref(0, 0, 0), vref(1, 0, 0), vref(2, 0, 0)]
        );
        assert_eq!(model.mesh.vertex_count(), 3);
    }

    #[test]
    fn quad_face_is_not_triangulated() {
        let src = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let model = load_obj_from_str(src).unwrap();
        // 4 corners -> 4 index triples, by design (a known fidelity limit).
        assert_eq!(model.mesh.vertex_count(), 4);
        assert_eq!(
            model.mesh.triangles.iter().map(|r| r.position).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );
    }

    #[test]
    fn slash_forms_resolve_missing_fields_to_zero() {
        let src = "v 0 0 0\nvt 0 0\nvt 1 0\nvn 0 0 1\nvn 0 1 0\n\
                   f 1/2/2 1//2 1/2 1\n";
        let model = load_obj_from_str(src).unwrap();
        assert_eq!(
            model.mesh.triangles,
            vec![vref(0, 1, 1), vref(0, 0, 1), vref(0, 1, 0), vref(0, 0, 0)]
        );
    }

    #[test]
    fn malformed_lines_are_skipped_not_fatal() {
        let src = "v 0 0 0\nv nope 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 x\nf 1 2 3\nvt 0.5\n";
        let model = load_obj_from_str(src).unwrap();
        assert_eq!(model.mesh.positions.len(), 3);
        assert_eq!(model.mesh.texcoords.len(), 0);
        // Only the well-formed face survived, and as a whole.
        assert_eq!(model.mesh.vertex_count(), 3);
    }

    #[test]
    fn zero_index_is_malformed() {
        let model = load_obj_from_str("v 0 0 0\nf 0 1 1\n").unwrap();
        assert!(model.mesh.is_empty());
    }

    #[test]
    fn empty_stream_yields_empty_mesh() {
        let model = load_obj_from_str("").unwrap();
        assert!(model.mesh.is_empty());
        assert_eq!(model.mesh.vertex_count(), 0);
        assert!(model.materials.is_empty());
    }

    #[test]
    fn comments_and_unknown_directives_are_ignored() {
        let model =
            load_obj_from_str("# a cube\no cube\ns off\ng side\nv 0 0 0\n").unwrap();
        assert_eq!(model.mesh.positions.len(), 1);
    }

    #[test]
    fn usemtl_records_the_last_name() {
        let model = load_obj_from_str("usemtl a\nusemtl b\n").unwrap();
        assert_eq!(model.active_material.as_deref(), Some("b"));
    }

    #[test]
    fn mtllib_without_base_is_skipped() {
        let model = load_obj_from_str("mtllib missing.mtl\nv 0 0 0\n").unwrap();
        assert!(model.materials.is_empty());
        assert_eq!(model.mesh.positions.len(), 1);
    }

    #[test]
    fn mtllib_resolves_relative_to_the_obj_file() {
        let dir = std::env::temp_dir().join("obzor3d-obj-test");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("cube.mtl"), "newmtl gold\nKd 0.9 0.7 0.2\n").unwrap();
        std::fs::write(
            dir.join("cube.obj"),
            "mtllib cube.mtl\nusemtl gold\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n",
        )
        .unwrap();

        let model = load_obj_from_path(dir.join("cube.obj")).unwrap();
        assert_eq!(model.active_material.as_deref(), Some("gold"));
        let gold = model.materials.resolve(model.active_material.as_deref());
        assert_eq!(gold.diffuse, [0.9, 0.7, 0.2]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unreadable_mtllib_does_not_abort_geometry() {
        let dir = std::env::temp_dir().join("obzor3d-obj-test-missing-mtl");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("m.obj"), "mtllib void.mtl\nv 0 0 0\n").unwrap();

        let model = load_obj_from_path(dir.join("m.obj")).unwrap();
        assert!(model.materials.is_empty());
        assert_eq!(model.mesh.positions.len(), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_obj_file_is_a_resource_error() {
        let err = load_obj_from_path("/definitely/not/here.obj").unwrap_err();
        assert!(matches!(err, AssetError::Resource { .. }));
    }
}
