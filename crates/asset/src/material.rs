//! Phong material constants parsed from MTL files.

use std::collections::HashMap;

/// Scalar material constants carried through to the shader. No texture
/// maps; the mesh itself is untextured.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ambient: [0.2, 0.2, 0.2],
            diffuse: [0.8, 0.8, 0.8],
            specular: [1.0, 1.0, 1.0],
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new("default")
    }
}

/// Name -> material map. Lookup misses resolve to `Material::default()`
/// explicitly; there is no process-wide default singleton.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MaterialTable {
    materials: HashMap<String, Material>,
}

impl MaterialTable {
    pub fn insert(&mut self, material: Material) {
        self.materials.insert(material.name.clone(), material);
    }

    pub fn get(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    /// Resolve a (possibly absent) material name, falling back to the
    /// default constants.
    pub fn resolve(&self, name: Option<&str>) -> Material {
        name.and_then(|n| self.materials.get(n))
            .cloned()
            .unwrap_or_default()
    }

    /// Merge another table in; later declarations win on name collision.
    pub fn merge(&mut self, other: MaterialTable) {
        self.materials.extend(other.materials);
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_falls_back_to_default() {
        let table = MaterialTable::default();
        let m = table.resolve(Some("missing"));
        assert_eq!(m, Material::default());
        assert_eq!(m.ambient, [0.2, 0.2, 0.2]);
        assert_eq!(m.diffuse, [0.8, 0.8, 0.8]);
        assert_eq!(m.specular, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn merge_is_last_declaration_wins() {
        let mut a = MaterialTable::default();
        a.insert(Material::new("gold"));

        let mut b = MaterialTable::default();
        let mut shiny = Material::new("gold");
        shiny.diffuse = [1.0, 0.8, 0.0];
        b.insert(shiny.clone());

        a.merge(b);
        assert_eq!(a.len(), 1);
        assert_eq!(a.get("gold"), Some(&shiny));
    }
}
