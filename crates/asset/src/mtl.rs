//! MTL material parser: `newmtl`, `Ka`, `Kd`, `Ks`.
//!
//! Recovery policy mirrors the OBJ parser: a malformed line is skipped with
//! a diagnostic and parsing continues; only stream I/O aborts the call.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::error::{AssetError, AssetResult};
use crate::material::{Material, MaterialTable};

/// Parse an MTL file from disk.
pub fn load_mtl_from_path(path: impl AsRef<Path>) -> AssetResult<MaterialTable> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| AssetError::Resource {
        path: path.to_path_buf(),
        source,
    })?;
    parse_mtl(BufReader::new(file), path)
}

/// Parse an MTL document from a [`BufRead`] implementation.
pub fn load_mtl_from_reader<R: BufRead>(reader: R) -> AssetResult<MaterialTable> {
    parse_mtl(reader, Path::new("<reader>"))
}

fn parse_mtl<R: BufRead>(reader: R, origin: &Path) -> AssetResult<MaterialTable> {
    let mut table = MaterialTable::default();
    let mut current: Option<Material> = None;

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
            "newmtl" => {
                let Some(name) = tokens.next() else {
                    log::warn!("{}:{}: newmtl without a name, skipped", origin.display(), line_no + 1);
                    continue;
                };
                // Finish the previous material before starting the next.
                if let Some(done) = current.take() {
                    table.insert(done);
                }
                current = Some(Material::new(name));
            }
            "Ka" | "Kd" | "Ks" => {
                let Some(material) = current.as_mut() else {
                    log::warn!(
                        "{}:{}: {} before any newmtl, skipped",
                        origin.display(),
                        line_no + 1,
                        tag
                    );
                    continue;
                };
                let Some(rgb) = parse_rgb(&mut tokens) else {
                    log::warn!(
                        "{}:{}: malformed {} line, skipped",
                        origin.display(),
                        line_no + 1,
                        tag
                    );
                    continue;
                };
                match tag {
                    "Ka" => material.ambient = rgb,
                    "Kd" => material.diffuse = rgb,
                    _ => material.specular = rgb,
                }
            }
            // Comments and unsupported directives (Ns, d, map_* ...).
            _ => {}
        }
    }

    if let Some(done) = current.take() {
        table.insert(done);
    }
    Ok(table)
}

fn parse_rgb<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Option<[f32; 3]> {
    let r = tokens.next()?.parse::<f32>().ok()?;
    let g = tokens.next()?.parse::<f32>().ok()?;
    let b = tokens.next()?.parse::<f32>().ok()?;
    Some([r, g, b])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(src: &str) -> MaterialTable {
        load_mtl_from_reader(Cursor::new(src)).expect("parse mtl")
    }

    #[test]
    fn parses_materials_with_components() {
        let table = parse(
            "newmtl gold\nKa 0.3 0.2 0.1\nKd 0.9 0.7 0.2\nKs 1.0 1.0 0.9\n\
             newmtl slate\nKd 0.4 0.4 0.45\n",
        );
        assert_eq!(table.len(), 2);
        let gold = table.get("gold").expect("gold present");
        assert_eq!(gold.ambient, [0.3, 0.2, 0.1]);
        assert_eq!(gold.diffuse, [0.9, 0.7, 0.2]);
        assert_eq!(gold.specular, [1.0, 1.0, 0.9]);
        // Unset components keep their defaults.
        let slate = table.get("slate").expect("slate present");
        assert_eq!(slate.ambient, [0.2, 0.2, 0.2]);
    }

    #[test]
    fn short_component_line_is_skipped() {
        let table = parse("newmtl m\nKd 1.0 0.5\nKs 0.1 0.2 0.3\n");
        let m = table.get("m").expect("m present");
        // The malformed Kd kept the default; the following line still parsed.
        assert_eq!(m.diffuse, [0.8, 0.8, 0.8]);
        assert_eq!(m.specular, [0.1, 0.2, 0.3]);
    }

    #[test]
    fn property_before_newmtl_is_skipped() {
        let table = parse("Kd 1.0 0.0 0.0\nnewmtl m\n");
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("m").map(|m| m.diffuse), Some([0.8, 0.8, 0.8]));
    }

    #[test]
    fn bad_float_is_skipped() {
        let table = parse("newmtl m\nKa zero 0.1 0.2\n");
        assert_eq!(table.get("m").map(|m| m.ambient), Some([0.2, 0.2, 0.2]));
    }

    #[test]
    fn missing_file_is_a_resource_error() {
        let err = load_mtl_from_path("/definitely/not/here.mtl").unwrap_err();
        assert!(matches!(err, AssetError::Resource { .. }));
    }

    #[test]
    fn redeclaration_wins() {
        let table = parse("newmtl m\nKd 0.1 0.1 0.1\nnewmtl m\nKd 0.9 0.9 0.9\n");
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("m").map(|m| m.diffuse), Some([0.9, 0.9, 0.9]));
    }
}
