//! Scan an fbx file and print what the converter makes of it.

use std::{fs::File, io::BufReader, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use fbx_import::{ConvertOptions, FbxSceneLoader, Node};
use fbxcel_dom::{
    any::AnyDocument,
    fbxcel::{low::v7400::AttributeValue, tree::v7400::NodeHandle},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "check_fbx")]
#[command(about = "Print the node tree of an FBX file")]
struct Cli {
    /// FBX file to load
    path: PathBuf,

    /// Split quads and n-gons into triangles
    #[arg(short, long)]
    triangulate: bool,

    /// Dump the raw FBX node tree instead of the converted scene
    #[arg(long)]
    raw: bool,

    /// Debug logging, unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if cli.raw {
        return dump_raw(&cli);
    }

    let loader = FbxSceneLoader::new(ConvertOptions::default().triangulate(cli.triangulate));
    let scene = loader
        .load_scene(&cli.path)
        .with_context(|| format!("failed to convert {}", cli.path.display()))?;

    println!("Loaded FBX with version = {}", scene.version);
    println!("{:#?}\n", scene.settings);
    print_node(0, &scene.root);
    if let Some(bbox) = scene.root.bounding_box().bounding_box() {
        println!("\nbounds: {:?} .. {:?}", bbox.min(), bbox.max());
    }
    Ok(())
}

fn dump_raw(cli: &Cli) -> Result<()> {
    let file = File::open(&cli.path)
        .with_context(|| format!("failed to open {}", cli.path.display()))?;
    let doc = AnyDocument::from_seekable_reader(BufReader::new(file))
        .context("failed to load document")?;
    match doc {
        AnyDocument::V7400(ver, doc) => {
            println!("FBX {}.{}", ver.major(), ver.minor());
            print_children(0, doc.tree().root());
            Ok(())
        }
        _ => bail!("FBX version unsupported"),
    }
}

fn print_node(depth: usize, node: &Node) {
    let indent = depth * 3;
    print!("{:indent$}{}", "", node.name);
    if let Some(mesh) = &node.mesh {
        print!(
            " <mesh: {} triangles, normals: {}, tangents: {}, uvs: {}>",
            mesh.triangle_count(),
            mesh.has_normals(),
            mesh.has_tangents(),
            mesh.has_uvs()
        );
    }
    println!();
    println!(
        "{:indent$}  t {:?} r {:?} s {:?}",
        "", node.position, node.rotation, node.scale
    );
    for child in &node.children {
        print_node(depth + 1, child);
    }
}

fn attr_display(attr: &AttributeValue) -> String {
    match attr {
        AttributeValue::Bool(v) => format!("{v}"),
        AttributeValue::I16(v) => format!("{v}"),
        AttributeValue::I32(v) => format!("{v}"),
        AttributeValue::I64(v) => format!("{v}"),
        AttributeValue::F32(v) => format!("{v}"),
        AttributeValue::F64(v) => format!("{v}"),
        AttributeValue::ArrBool(v) => format!("[bool; {}]", v.len()),
        AttributeValue::ArrI32(v) => format!("[i32; {}]", v.len()),
        AttributeValue::ArrI64(v) => format!("[i64; {}]", v.len()),
        AttributeValue::ArrF32(v) => format!("[f32; {}]", v.len()),
        AttributeValue::ArrF64(v) => format!("[f64; {}]", v.len()),
        AttributeValue::String(s) => s.replace("\u{0}\u{1}", "::"),
        AttributeValue::Binary(v) => format!("[u8; {}]", v.len()),
    }
}

fn print_children(depth: usize, node: NodeHandle<'_>) {
    let indent = depth * 3;
    for child in node.children() {
        print!("{:indent$}", "");
        if !child.name().is_empty() {
            print!("{} ", child.name());
        }
        let attrs: Vec<_> = child.attributes().iter().map(attr_display).collect();
        println!("[{}]", attrs.join(", "));
        if child.children().next().is_some() {
            println!("{:indent$}{{", "");
            print_children(depth + 1, child);
            println!("{:indent$}}}", "");
        }
    }
}
