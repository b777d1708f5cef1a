use std::hint::black_box;

use tminus_core::format::{Template, TickUnit, TimeParts, format_remaining};

fn main() {
    divan::main();
}

const REMAINING: i64 = 2 * 86_400_000 + 3 * 3_600_000 + 4 * 60_000 + 5_600;

#[divan::bench]
fn decompose() -> TimeParts {
    TimeParts::from_millis(black_box(REMAINING), true)
}

#[divan::bench]
fn parse_template() -> Template {
    Template::parse(black_box("dd days hh:mm:ss.ms"))
}

#[divan::bench]
fn render_template(bencher: divan::Bencher) {
    let template = Template::parse("dd days hh:mm:ss.ms");
    let parts = TimeParts::from_millis(REMAINING, true);

    bencher.bench_local(|| template.render(black_box(&parts)));
}

#[divan::bench(args = [TickUnit::Seconds, TickUnit::Centiseconds])]
fn format_tuple(unit: TickUnit) {
    black_box(format_remaining(black_box(REMAINING), None, unit, true));
}
