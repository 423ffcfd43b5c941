//! Create meshes from FBX geometry.

use std::cell::{Cell, RefCell};

use fbxcel_dom::v7400::{
    data::mesh::{PolygonVertexIndex, PolygonVertices, TriangleVertices},
    object::geometry::MeshHandle,
};
use glam::{DVec3, Vec2, Vec3};
use tracing::{debug, trace};

#[cfg(feature = "profile")]
use tracing::info_span;

use crate::{
    data::mesh::Mesh,
    error::{FbxError, Result},
    layer::{LayerElement, VertexRef, NORMALS, TANGENTS, UVS},
    loader::ConvertOptions,
    utils::triangulate,
};

/// Triangles of a mesh, and the polygon-vertex number of each triangle vertex.
struct Triangles<'a> {
    vertices: TriangleVertices<'a>,
    polygon_vertices: Vec<usize>,
    polygon_count: usize,
}

/// Converts `Geometry` objects of class `Mesh`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeshConverter {
    options: ConvertOptions,
}

impl MeshConverter {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Flattens the mesh into per-polygon-vertex arrays.
    ///
    /// Fails on polygons that are not triangles, unless
    /// [`ConvertOptions::triangulate`] is set.
    pub fn convert(&self, mesh: &MeshHandle<'_>) -> Result<Mesh> {
        let id = mesh.object_id().raw();
        #[cfg(feature = "profile")]
        let _convert_mesh_span = info_span!("convert_mesh", id).entered();

        let malformed = |err: anyhow::Error| FbxError::MalformedObject {
            object: id,
            reason: err.to_string(),
        };
        let polygon_vertices = mesh.polygon_vertices().map_err(malformed)?;
        let control_point_count = polygon_vertices
            .raw_control_points()
            .map_err(malformed)?
            .count();

        let triangles = self.triangulate(id, &polygon_vertices, control_point_count)?;
        debug!(
            "Converting mesh {id}: {control_point_count} control points, {} polygons",
            triangles.polygon_count
        );

        let normals = LayerElement::<Vec3>::from_mesh(mesh, &NORMALS)?;
        let tangents = LayerElement::<Vec3>::from_mesh(mesh, &TANGENTS)?;
        let uvs = LayerElement::<Vec2>::from_mesh(mesh, &UVS)?;
        trace!(
            "mesh {id}: normals {:?}, tangents {:?}, uvs {:?}",
            normals.as_ref().map(|e| (e.mapping(), e.reference())),
            tangents.as_ref().map(|e| (e.mapping(), e.reference())),
            uvs.as_ref().map(|e| (e.mapping(), e.reference())),
        );

        let vertex_count = triangles.vertices.len();
        let capacity_if = |present: bool| {
            if present {
                vertex_count
            } else {
                0
            }
        };
        let mut out = Mesh {
            vertices: Vec::with_capacity(vertex_count),
            normals: Vec::with_capacity(capacity_if(normals.is_some())),
            tangents: Vec::with_capacity(capacity_if(tangents.is_some())),
            uvs: Vec::with_capacity(capacity_if(uvs.is_some())),
        };

        let tris = &triangles.vertices;
        for (tri_vi, &polygon_vertex) in tris
            .triangle_vertex_indices()
            .zip(&triangles.polygon_vertices)
        {
            let control_point = tris
                .control_point_index(tri_vi)
                .map_or(0, |cpi| cpi.to_u32() as usize);
            let position = tris
                .control_point(tri_vi)
                .ok_or(FbxError::MissingControlPoint {
                    mesh: id,
                    index: control_point,
                    count: control_point_count,
                })?;
            let polygon = tris
                .polygon_index(tri_vi.triangle_index())
                .map_or(0, |p| p.to_usize());
            let vertex = VertexRef {
                polygon,
                polygon_vertex,
                control_point,
            };
            out.vertices.push(DVec3::from(position).as_vec3());
            if let Some(normals) = &normals {
                out.normals.push(normals.resolve(vertex)?);
            }
            if let Some(tangents) = &tangents {
                out.tangents.push(tangents.resolve(vertex)?);
            }
            if let Some(uvs) = &uvs {
                out.uvs.push(uvs.resolve(vertex)?);
            }
        }

        debug!(
            "Mesh {id} expanded to {} vertices ({} triangles)",
            out.vertex_count(),
            out.triangle_count()
        );
        Ok(out)
    }

    /// Splits every polygon into triangles, remembering each corner's polygon vertex.
    fn triangulate<'a>(
        &self,
        id: i64,
        polygon_vertices: &PolygonVertices<'a>,
        control_point_count: usize,
    ) -> Result<Triangles<'a>> {
        let split_polygons = self.options.triangulate;
        let polygon = Cell::new(0usize);
        let start = Cell::new(0usize);
        let corners = RefCell::new(Vec::new());

        let vertices = polygon_vertices
            .triangulate_each(|vertices, pvis, results| {
                let size = pvis.len();
                let mut triangles = Vec::new();
                if size == 3 {
                    triangles.push([0, 1, 2]);
                } else if split_polygons {
                    let points = pvis
                        .iter()
                        .map(|&pvi| {
                            vertices.control_point(pvi).map(DVec3::from).ok_or_else(|| {
                                FbxError::MissingControlPoint {
                                    mesh: id,
                                    index: vertices
                                        .polygon_vertex(pvi)
                                        .map_or(0, |pv| pv.to_u32() as usize),
                                    count: control_point_count,
                                }
                            })
                        })
                        .collect::<Result<Vec<_>>>()?;
                    triangulate::triangulate(&points, &mut triangles).map_err(|err| {
                        FbxError::Triangulation {
                            mesh: id,
                            polygon: polygon.get(),
                            size,
                            reason: err.to_string(),
                        }
                    })?;
                } else {
                    return Err(FbxError::NotTriangulated {
                        mesh: id,
                        polygon: polygon.get(),
                        size,
                    }
                    .into());
                }

                let mut corners = corners.borrow_mut();
                for triangle in triangles {
                    results.push(triangle.map(|c| pvis[c]));
                    corners.extend(triangle.map(|c| start.get() + c));
                }
                polygon.set(polygon.get() + 1);
                start.set(start.get() + size);
                Ok(())
            })
            .map_err(|err| match err.downcast::<FbxError>() {
                Ok(err) => err,
                // The only failure left is a polygon missing its end marker.
                Err(_) => FbxError::UnterminatedPolygon { mesh: id },
            })?;
        Ok(Triangles {
            vertices,
            polygon_vertices: corners.into_inner(),
            polygon_count: polygon.get(),
        })
    }
}

#[cfg(test)]
mod tests {
    use fbxcel_dom::v7400::object::{geometry::TypedGeometryHandle, TypedObjectHandle};

    use super::*;
    use crate::utils::{fbx_extend::DocumentExt, test_fbx::FbxFile};

    const QUAD: [f64; 12] = [
        0.0, 0.0, 0.0, //
        1.0, 0.0, 0.0, //
        1.0, 1.0, 0.0, //
        0.0, 1.0, 0.0,
    ];

    fn convert(file: &FbxFile, options: ConvertOptions) -> Result<Mesh> {
        let doc = file.document();
        match doc.object_by_id(7).map(|obj| obj.get_typed()) {
            Some(TypedObjectHandle::Geometry(TypedGeometryHandle::Mesh(mesh))) => {
                MeshConverter::new(options).convert(&mesh)
            }
            other => panic!("no mesh geometry: {other:?}"),
        }
    }

    /// Unit square in the XY plane, with the given polygons.
    fn quad(polygon_vertex_index: Vec<i32>) -> (FbxFile, fbxcel::tree::v7400::NodeId) {
        let mut file = FbxFile::new();
        let geometry = file.mesh(7, QUAD.to_vec(), polygon_vertex_index);
        (file, geometry)
    }

    #[test]
    fn flattens_positions_per_polygon_vertex() {
        let (file, _) = quad(vec![0, 1, !2, 2, 3, !0]);
        let mesh = convert(&file, ConvertOptions::default()).unwrap();
        assert_eq!(
            mesh.vertices,
            [
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(0.0, 0.0, 0.0),
            ]
        );
        assert!(mesh.normals.is_empty());
        assert!(mesh.tangents.is_empty());
        assert!(mesh.uvs.is_empty());
    }

    #[test]
    fn resolves_every_attribute() {
        let (mut file, geometry) = quad(vec![0, 1, !2, 2, 3, !0]);
        // One normal per control point.
        let normals = file.layer_element(geometry, "LayerElementNormal", 0, "ByVertice", "Direct");
        let data: Vec<f64> = [0.0, 0.0, 1.0]
            .repeat(3)
            .into_iter()
            .chain([0.0, 0.0, -1.0])
            .collect();
        file.child(normals, "Normals", vec![data.into()]);
        // One tangent for everything.
        let tangents = file.layer_element(geometry, "LayerElementTangent", 0, "AllSame", "Direct");
        file.child(tangents, "Tangents", vec![vec![1.0f64, 0.0, 0.0].into()]);
        // Shared UVs through an index array, per polygon vertex.
        let uvs =
            file.layer_element(geometry, "LayerElementUV", 0, "ByPolygonVertex", "IndexToDirect");
        file.child(uvs, "UV", vec![vec![0.0f64, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0].into()]);
        file.child(uvs, "UVIndex", vec![vec![0i32, 1, 2, 2, 3, 0].into()]);

        let mesh = convert(&file, ConvertOptions::default()).unwrap();
        assert_eq!(mesh.normals.len(), 6);
        assert_eq!(mesh.normals[4], -Vec3::Z);
        assert_eq!(mesh.normals[5], Vec3::Z);
        assert_eq!(mesh.tangents, [Vec3::X; 6]);
        assert_eq!(
            mesh.uvs,
            [
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 1.0),
                Vec2::new(0.0, 0.0),
            ]
        );
    }

    #[test]
    fn rejects_quads_unless_triangulating() {
        let (mut file, geometry) = quad(vec![0, 1, 2, !3]);
        let uvs = file.layer_element(geometry, "LayerElementUV", 0, "ByPolygonVertex", "Direct");
        file.child(uvs, "UV", vec![vec![0.0f64, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0].into()]);
        assert!(matches!(
            convert(&file, ConvertOptions::default()),
            Err(FbxError::NotTriangulated {
                mesh: 7,
                polygon: 0,
                size: 4
            })
        ));

        let mesh = convert(&file, ConvertOptions::default().triangulate(true)).unwrap();
        assert_eq!(mesh.triangle_count(), 2);
        // Attributes still follow the original corner: the second triangle
        // starts at corner 2.
        assert_eq!(mesh.uvs[3], Vec2::new(1.0, 1.0));
        assert_eq!(mesh.vertices[3], Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn polygon_vertex_numbers_span_polygons() {
        // A triangle, then a quad: the quad's corners are polygon vertices 3..7.
        let (mut file, geometry) = quad(vec![0, 1, !2, 0, 1, 2, !3]);
        let uvs = file.layer_element(geometry, "LayerElementUV", 0, "ByPolygonVertex", "Direct");
        let data: Vec<f64> = (0..7).flat_map(|i| [i as f64, 0.0]).collect();
        file.child(uvs, "UV", vec![data.into()]);
        let normals = file.layer_element(geometry, "LayerElementNormal", 0, "ByPolygon", "Direct");
        file.child(normals, "Normals", vec![vec![0.0f64, 0.0, 1.0, 1.0, 0.0, 0.0].into()]);

        let mesh = convert(&file, ConvertOptions::default().triangulate(true)).unwrap();
        assert_eq!(mesh.triangle_count(), 3);
        let us: Vec<f32> = mesh.uvs.iter().map(|uv| uv.x).collect();
        assert_eq!(us, [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 5.0, 6.0, 3.0]);
        assert_eq!(mesh.normals[2], Vec3::Z);
        assert_eq!(mesh.normals[3..], [Vec3::X; 6]);
    }

    #[test]
    fn attribute_errors_propagate() {
        let (mut file, geometry) = quad(vec![0, 1, !2]);
        let uvs =
            file.layer_element(geometry, "LayerElementUV", 0, "ByPolygonVertex", "IndexToDirect");
        file.child(uvs, "UV", vec![vec![0.0f64, 0.0].into()]);
        file.child(uvs, "UVIndex", vec![vec![0i32, 0].into()]);
        assert!(matches!(
            convert(&file, ConvertOptions::default()),
            Err(FbxError::IndexOutOfRange { array: "index", index: 2, .. })
        ));
    }

    #[test]
    fn bad_polygons_are_reported() {
        let (file, _) = quad(vec![0, 1, !2, 3, 0, 1]);
        assert!(matches!(
            convert(&file, ConvertOptions::default()),
            Err(FbxError::UnterminatedPolygon { mesh: 7 })
        ));

        let (file, _) = quad(vec![0, 1, !9]);
        assert!(matches!(
            convert(&file, ConvertOptions::default()),
            Err(FbxError::MissingControlPoint { mesh: 7, index: 9, count: 4 })
        ));

        let (file, _) = quad(vec![0, 1, 2, 8, !3]);
        assert!(matches!(
            convert(&file, ConvertOptions::default().triangulate(true)),
            Err(FbxError::MissingControlPoint { index: 8, count: 4, .. })
        ));
    }

    #[test]
    fn missing_vertices_is_malformed() {
        let mut file = FbxFile::new();
        file.object("Geometry", 7, "", "Mesh");
        assert!(matches!(
            convert(&file, ConvertOptions::default()),
            Err(FbxError::MalformedObject { object: 7, .. })
        ));
    }

    #[test]
    fn missing_polygon_vertex_index_is_malformed() {
        let mut file = FbxFile::new();
        let geometry = file.object("Geometry", 7, "", "Mesh");
        file.child(geometry, "Vertices", vec![QUAD.to_vec().into()]);
        match convert(&file, ConvertOptions::default()) {
            Err(FbxError::MalformedObject { object: 7, reason }) => {
                assert!(reason.contains("PolygonVertexIndex"), "{reason}");
            }
            other => panic!("expected a malformed mesh, got {other:?}"),
        }
    }
}
