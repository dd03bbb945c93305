use crate::aggregate::MovementRecord;
use crate::log::row::{ComponentKind, LevelCounts, TraceData};
use crate::path::NodePath;
use anyhow::{Context, bail};
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;

/// Parse a DATAMOVE trace log into layout pairs and movement rows.
///
/// The trace interleaves three line shapes with unrelated runtime output:
///
/// DATAMOVE hierarchy counts: 1 2 4 8
/// DATAMOVE INFO unit 3 0x7f2a40
/// DATAMOVE: edt_0x42 128 bytes 0x7f2a40 -> 0x7f2a80
///
/// Lines matching none of these are ignored.
pub fn parse_trace_file(path: &str) -> anyhow::Result<TraceData> {
    let text = fs::read_to_string(path).with_context(|| format!("read trace file {}", path))?;
    parse_trace(&text)
}

pub fn parse_trace(text: &str) -> anyhow::Result<TraceData> {
    let counts = parse_header(text)?;

    // First pass: component map (addr -> path). INFO lines may appear
    // anywhere, so the map is complete before any movement is resolved.
    let mut components: BTreeMap<String, NodePath> = BTreeMap::new();
    for (lineno, line) in text.lines().enumerate() {
        let lno = lineno + 1;
        if !line.starts_with("DATAMOVE INFO") {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 5 {
            bail!("trace parse error at line {}: short INFO line: {:?}", lno, line);
        }
        let kind = match ComponentKind::parse(tokens[2]) {
            Some(k) => k,
            None => bail!(
                "trace parse error at line {}: unknown component kind {:?}",
                lno,
                tokens[2]
            ),
        };
        let index: u32 = tokens[3]
            .parse()
            .with_context(|| format!("bad component index at line {}: {}", lno, tokens[3]))?;
        components.insert(tokens[4].to_string(), counts.component_path(kind, index));
    }

    // Second pass: movement lines, endpoints resolved through the map.
    let re = Regex::new(r"^DATAMOVE: (\w+) (\d+) bytes (0x[0-9a-fA-F]+) -> (0x[0-9a-fA-F]+)\s*$")?;
    let mut movements = Vec::new();
    let mut skipped = 0usize;
    for (lineno, line) in text.lines().enumerate() {
        let lno = lineno + 1;
        let caps = match re.captures(line) {
            Some(c) => c,
            None => continue,
        };
        let tag = caps.get(1).unwrap().as_str().to_string();
        let size: u64 = caps.get(2).unwrap().as_str().parse()?;
        let src_addr = caps.get(3).unwrap().as_str();
        let dst_addr = caps.get(4).unwrap().as_str();

        match (components.get(src_addr), components.get(dst_addr)) {
            (Some(source), Some(destination)) => movements.push(MovementRecord {
                source: source.clone(),
                destination: destination.clone(),
                size,
                tag: Some(tag),
            }),
            _ => {
                skipped += 1;
                eprintln!(
                    "WARN: line {}: movement references unannounced component ({} -> {})",
                    lno, src_addr, dst_addr
                );
            }
        }
    }

    // Layout pairs from the component map, one per non-root component.
    let mut layout = Vec::new();
    for path in components.values() {
        if path.is_root() {
            continue;
        }
        let parent = path
            .parent()
            .map_err(|e| anyhow::anyhow!("component path {}: {}", path, e))?;
        layout.push((path.clone(), parent));
    }
    layout.sort();
    layout.dedup();

    Ok(TraceData {
        layout,
        movements,
        skipped,
    })
}

/// Locate the hierarchy header and read the per-level counts off it.
fn parse_header(text: &str) -> anyhow::Result<LevelCounts> {
    let line = text
        .lines()
        .find(|l| l.starts_with("DATAMOVE") && l.contains("hierarchy"));
    let line = match line {
        Some(l) => l,
        None => bail!("trace has no DATAMOVE hierarchy header"),
    };
    let counts: Vec<u32> = line
        .split_whitespace()
        .filter_map(|t| t.parse().ok())
        .collect();
    if counts.len() < 4 {
        bail!("hierarchy header announces {} levels, need 4: {:?}", counts.len(), line);
    }
    if counts[1..4].iter().any(|&c| c == 0) {
        bail!("hierarchy header has a zero level count: {:?}", line);
    }
    Ok(LevelCounts {
        chips: counts[0],
        units: counts[1],
        blocks: counts[2],
        workers: counts[3],
    })
}
