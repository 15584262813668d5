use console::Style;
use iss_core::spots::{BlobDetector, SpotAttributes};
use iss_core::stack::{ImageStack, SliceIndex};

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
        }
    }
}

pub fn print_detection_summary(
    detector: &BlobDetector,
    stack: &ImageStack,
    n_processes: Option<usize>,
) {
    let s = Styles::new();
    let config = detector.config();
    let (h, w) = stack.plane_shape();

    println!();
    println!("  {}", s.title.apply_to("ISS Spot Detection"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(18)));
    println!();

    println!(
        "  {:<14}{} rounds x {} channels x {} planes, {}x{}",
        s.label.apply_to("Stack"),
        stack.num_rounds(),
        stack.num_chs(),
        stack.num_zplanes(),
        w,
        h
    );
    match n_processes {
        Some(n) => println!("  {:<14}{}", s.label.apply_to("Workers"), s.value.apply_to(n)),
        None => println!(
            "  {:<14}{}",
            s.label.apply_to("Workers"),
            s.disabled.apply_to("sequential")
        ),
    }
    println!();

    println!("  {}", s.header.apply_to("Detector"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Method"),
        s.method.apply_to(detector.method())
    );
    println!(
        "    {:<12}{} .. {} ({} scales)",
        s.label.apply_to("Sigma"),
        s.value.apply_to(config.min_sigma),
        s.value.apply_to(config.max_sigma),
        config.num_sigma
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Threshold"),
        s.value.apply_to(config.threshold)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Overlap"),
        s.value.apply_to(config.overlap)
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Intensity"),
        s.method.apply_to(detector.measurement())
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Grouping"),
        s.value.apply_to(if config.is_volume { "volume" } else { "per plane" })
    );
    println!();
}

/// Spot counts per slice, in round/channel/plane order.
pub fn print_slice_counts(grouped: &[(SpotAttributes, SliceIndex)]) {
    let s = Styles::new();
    let mut rows: Vec<(SliceIndex, usize)> = grouped.iter().map(|(t, i)| (*i, t.len())).collect();
    rows.sort_by_key(|(index, _)| *index);

    println!();
    println!("  {}", s.header.apply_to("Spots per slice"));
    for (index, count) in rows {
        let label = match index.z {
            Some(z) => format!("r{} c{} z{}", index.round, index.ch, z),
            None => format!("r{} c{}", index.round, index.ch),
        };
        println!("    {:<12}{}", s.label.apply_to(label), s.value.apply_to(count));
    }
}
