//! Output renderers and formatting helpers for CLI commands.

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use swarm_prune_engine::{ContainerUsage, DiskUsage, ImageUsage, Node, VolumeUsage};

use crate::executor::{OperationKind, OperationOutcome, ReclaimReport, RemovalAction};

/// Rendering knobs shared by every node block of one command.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RenderStyle {
    pub(crate) verbose: bool,
    pub(crate) now: DateTime<Utc>,
}

pub(crate) fn write_node_header(out: &mut impl Write, banner: &str, node: &Node) -> io::Result<()> {
    writeln!(out, "{banner} {} {}", node.hostname(), node.spec.role.as_str())
}

pub(crate) fn write_outcome(
    out: &mut impl Write,
    hostname: &str,
    outcome: &OperationOutcome,
    style: RenderStyle,
) -> io::Result<()> {
    match outcome {
        OperationOutcome::Success { report } => write_report(out, report, style),
        OperationOutcome::Failure { cause, .. } => writeln!(
            out,
            "  ERROR: {} on {hostname}: {cause}",
            outcome.kind().label()
        ),
    }
}

fn write_report(out: &mut impl Write, report: &ReclaimReport, style: RenderStyle) -> io::Result<()> {
    let noun = match report.kind {
        OperationKind::Containers => "Containers",
        OperationKind::Images => "Images",
        OperationKind::Volumes => "Volumes",
        OperationKind::Networks => "Networks",
        OperationKind::DiskUsage => {
            return report
                .usage
                .as_ref()
                .map_or(Ok(()), |usage| write_disk_usage(out, usage, style));
        }
    };

    if report.removed.is_empty() {
        return writeln!(out, "    No {noun} Deleted");
    }
    writeln!(out, "    Deleted {noun}:")?;
    for object in &report.removed {
        match object.action {
            RemovalAction::Removed => writeln!(out, "        {}", object.id)?,
            RemovalAction::Untagged => writeln!(out, "        untagged: {}", object.id)?,
            RemovalAction::Deleted => writeln!(out, "        deleted: {}", object.id)?,
        }
    }
    Ok(())
}

pub(crate) fn write_node_subtotal(out: &mut impl Write, bytes: u64) -> io::Result<()> {
    writeln!(out, "  Node reclaimed space: {}", format_bytes(bytes))
}

pub(crate) fn write_grand_total(out: &mut impl Write, bytes: u64) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "  Total Swarm reclaimed space: {}", format_bytes(bytes))
}

/// One line of the disk usage summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UsageRow {
    pub(crate) label: &'static str,
    pub(crate) total: usize,
    pub(crate) active: usize,
    pub(crate) size: u64,
    pub(crate) reclaimable: u64,
}

impl UsageRow {
    fn reclaimable_display(&self) -> String {
        if self.size == 0 {
            format_bytes(self.reclaimable)
        } else {
            let percent = self.reclaimable.saturating_mul(100) / self.size;
            format!("{} ({percent}%)", format_bytes(self.reclaimable))
        }
    }
}

pub(crate) fn summarize_disk_usage(usage: &DiskUsage) -> [UsageRow; 3] {
    let layers = non_negative(usage.layers_size);
    let images_in_use: u64 = usage
        .images
        .iter()
        .filter(|image| image.containers > 0)
        .map(unique_size)
        .sum();
    let images = UsageRow {
        label: "Images",
        total: usage.images.len(),
        active: usage.images.iter().filter(|image| image.containers > 0).count(),
        size: layers,
        reclaimable: layers.saturating_sub(images_in_use),
    };

    let containers = UsageRow {
        label: "Containers",
        total: usage.containers.len(),
        active: usage
            .containers
            .iter()
            .filter(|container| container.state == "running")
            .count(),
        size: usage
            .containers
            .iter()
            .map(|container| non_negative(container.size_rw))
            .sum(),
        reclaimable: usage
            .containers
            .iter()
            .filter(|container| container.state != "running")
            .map(|container| non_negative(container.size_rw))
            .sum(),
    };

    let volumes = UsageRow {
        label: "Local Volumes",
        total: usage.volumes.len(),
        active: usage
            .volumes
            .iter()
            .filter(|volume| volume_refs(volume) > 0)
            .count(),
        size: usage.volumes.iter().map(volume_size).sum(),
        reclaimable: usage
            .volumes
            .iter()
            .filter(|volume| volume_refs(volume) == 0)
            .map(volume_size)
            .sum(),
    };

    [images, containers, volumes]
}

pub(crate) fn write_disk_usage(
    out: &mut impl Write,
    usage: &DiskUsage,
    style: RenderStyle,
) -> io::Result<()> {
    let summary: Vec<Vec<String>> = summarize_disk_usage(usage)
        .iter()
        .map(|row| {
            vec![
                row.label.to_string(),
                row.total.to_string(),
                row.active.to_string(),
                format_bytes(row.size),
                row.reclaimable_display(),
            ]
        })
        .collect();
    write_table(out, &["TYPE", "TOTAL", "ACTIVE", "SIZE", "RECLAIMABLE"], &summary)?;

    if !style.verbose {
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "Images space usage:")?;
    writeln!(out)?;
    let images: Vec<Vec<String>> = usage
        .images
        .iter()
        .flat_map(|image| image_rows(image, style.now))
        .collect();
    write_table(
        out,
        &[
            "REPOSITORY",
            "TAG",
            "IMAGE ID",
            "CREATED",
            "SIZE",
            "SHARED SIZE",
            "UNIQUE SIZE",
            "CONTAINERS",
        ],
        &images,
    )?;

    writeln!(out)?;
    writeln!(out, "Containers space usage:")?;
    writeln!(out)?;
    let containers: Vec<Vec<String>> = usage
        .containers
        .iter()
        .map(|container| container_row(container, style.now))
        .collect();
    write_table(
        out,
        &[
            "CONTAINER ID",
            "IMAGE",
            "COMMAND",
            "LOCAL VOLUMES",
            "SIZE",
            "CREATED",
            "STATUS",
            "NAMES",
        ],
        &containers,
    )?;

    writeln!(out)?;
    writeln!(out, "Local Volumes space usage:")?;
    writeln!(out)?;
    let volumes: Vec<Vec<String>> = usage.volumes.iter().map(volume_row).collect();
    write_table(out, &["VOLUME NAME", "LINKS", "SIZE"], &volumes)
}

fn image_rows(image: &ImageUsage, now: DateTime<Utc>) -> Vec<Vec<String>> {
    let tail = vec![
        short_id(&image.id),
        format_age(image.created, now),
        format_bytes(non_negative(image.size)),
        if image.shared_size < 0 {
            "N/A".to_string()
        } else {
            format_bytes(non_negative(image.shared_size))
        },
        format_bytes(unique_size(image)),
        if image.containers < 0 {
            "N/A".to_string()
        } else {
            image.containers.to_string()
        },
    ];

    let tags: Vec<(String, String)> = if image.repo_tags.is_empty() {
        vec![("<none>".to_string(), "<none>".to_string())]
    } else {
        image
            .repo_tags
            .iter()
            .map(String::as_str)
            .map(split_reference)
            .collect()
    };

    tags.into_iter()
        .map(|(repository, tag)| {
            let mut row = vec![repository, tag];
            row.extend(tail.iter().cloned());
            row
        })
        .collect()
}

fn container_row(container: &ContainerUsage, now: DateTime<Utc>) -> Vec<String> {
    let local_volumes = container
        .mounts
        .iter()
        .filter(|mount| mount.get("Type").is_some_and(|kind| kind == "volume"))
        .count();
    let names = container
        .names
        .iter()
        .map(|name| name.trim_start_matches('/'))
        .collect::<Vec<_>>()
        .join(",");
    vec![
        short_id(&container.id),
        container.image.clone(),
        format!("\"{}\"", ellipsis(&container.command, 20)),
        local_volumes.to_string(),
        format_bytes(non_negative(container.size_rw)),
        format_age(container.created, now),
        container.status.clone(),
        names,
    ]
}

fn volume_row(volume: &VolumeUsage) -> Vec<String> {
    let links = volume
        .usage_data
        .as_ref()
        .filter(|data| data.ref_count >= 0)
        .map_or_else(|| "N/A".to_string(), |data| data.ref_count.to_string());
    vec![
        volume.name.clone(),
        links,
        format_bytes(volume_size(volume)),
    ]
}

/// Left-aligned columns separated by three spaces.
fn write_table(out: &mut impl Write, headers: &[&str], rows: &[Vec<String>]) -> io::Result<()> {
    let mut widths: Vec<usize> = headers.iter().map(|header| header.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let header_cells: Vec<String> = headers.iter().map(ToString::to_string).collect();
    write_row(out, &widths, &header_cells)?;
    for row in rows {
        write_row(out, &widths, row)?;
    }
    Ok(())
}

fn write_row(out: &mut impl Write, widths: &[usize], cells: &[String]) -> io::Result<()> {
    let last = cells.len().saturating_sub(1);
    let mut line = String::new();
    for (index, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if index == last {
            line.push_str(cell);
        } else {
            let padding = width.saturating_sub(cell.chars().count()) + 3;
            line.push_str(cell);
            line.push_str(&" ".repeat(padding));
        }
    }
    writeln!(out, "{line}")
}

fn split_reference(reference: &str) -> (String, String) {
    match reference.rsplit_once(':') {
        Some((repository, tag)) if !tag.contains('/') => (repository.to_string(), tag.to_string()),
        _ => (reference.to_string(), "<none>".to_string()),
    }
}

fn short_id(id: &str) -> String {
    let bare = id.strip_prefix("sha256:").unwrap_or(id);
    bare.chars().take(12).collect()
}

fn ellipsis(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        value.to_string()
    } else {
        let mut shortened: String = value.chars().take(max.saturating_sub(1)).collect();
        shortened.push('…');
        shortened
    }
}

fn unique_size(image: &ImageUsage) -> u64 {
    if image.shared_size < 0 {
        non_negative(image.size)
    } else {
        non_negative(image.size).saturating_sub(non_negative(image.shared_size))
    }
}

fn volume_size(volume: &VolumeUsage) -> u64 {
    volume
        .usage_data
        .as_ref()
        .map_or(0, |data| non_negative(data.size))
}

fn volume_refs(volume: &VolumeUsage) -> i64 {
    volume.usage_data.as_ref().map_or(0, |data| data.ref_count)
}

fn non_negative(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

/// Relative age in the style of `docker system df -v`.
#[must_use]
pub(crate) fn format_age(created: i64, now: DateTime<Utc>) -> String {
    const MINUTE: i64 = 60;
    const HOUR: i64 = 60 * MINUTE;
    const DAY: i64 = 24 * HOUR;
    const WEEK: i64 = 7 * DAY;
    const MONTH: i64 = 30 * DAY;
    const YEAR: i64 = 365 * DAY;

    if created <= 0 {
        return "N/A".to_string();
    }
    let seconds = (now.timestamp() - created).max(0);
    let human = match seconds {
        0 => "Less than a second".to_string(),
        s if s < MINUTE => format!("{s} seconds"),
        s if s < 2 * MINUTE => "About a minute".to_string(),
        s if s < HOUR => format!("{} minutes", s / MINUTE),
        s if s < 2 * HOUR => "About an hour".to_string(),
        s if s < 2 * DAY => format!("{} hours", s / HOUR),
        s if s < 2 * WEEK => format!("{} days", s / DAY),
        s if s < 2 * MONTH => format!("{} weeks", s / WEEK),
        s if s < 2 * YEAR => format!("{} months", s / MONTH),
        s => format!("{} years", s / YEAR),
    };
    format!("{human} ago")
}

/// Human-readable size using binary multiples and one decimal place.
#[must_use]
pub(crate) fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["KB", "MB", "GB", "TB", "PB"];
    const STEP: f64 = 1024.0;
    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes_to_f64(bytes) / STEP;
    let mut unit = 0;
    while value >= STEP && unit < UNITS.len() - 1 {
        value /= STEP;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

fn bytes_to_f64(value: u64) -> f64 {
    let high = u32::try_from(value >> 32).unwrap_or(u32::MAX);
    let low = u32::try_from(value & 0xFFFF_FFFF).unwrap_or(u32::MAX);
    f64::from(high) * 4_294_967_296.0 + f64::from(low)
}
