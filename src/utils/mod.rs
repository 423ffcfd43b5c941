pub mod bbox;
pub mod fbx_extend;
#[cfg(test)]
pub(crate) mod test_fbx;
pub mod triangulate;
