use clap::Parser;
use color_eyre::Result;

use crashlens::aggregate::{AggregateResult, CategoryCount, GeoSample, HourWeekdayMatrix, TrendPoint};
use crashlens::cli::Args;
use crashlens::config::AppConfig;
use crashlens::criteria::FilterCriteria;
use crashlens::schema::Role;
use crashlens::{convert, source, Dashboard, ResultBundle};

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AppConfig::from_path(path)?,
        None => AppConfig::load()?,
    };
    let infer_schema_length = args.infer_schema_length.unwrap_or(config.infer_schema_length);

    if let Some(output) = &args.convert {
        let rows = convert::csv_to_parquet(&args.path, output, infer_schema_length)?;
        println!("Wrote {} rows to {}", rows, output.display());
        return Ok(());
    }

    let table = source::load_table(&args.path, infer_schema_length)?;
    let dashboard =
        Dashboard::with_sampling(table, config.geo_sample_size, config.geo_sample_seed)?;

    if args.show_schema {
        print!("{}", dashboard.schema());
        return Ok(());
    }
    if args.list_options {
        print_options(&dashboard)?;
        return Ok(());
    }

    let criteria: FilterCriteria = (&args).into();
    let bundle = dashboard.evaluate(&criteria)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&bundle)?);
    } else {
        print_report(&bundle);
    }
    Ok(())
}

fn print_options(dashboard: &Dashboard) -> Result<()> {
    print_list("Boroughs", &dashboard.options(Role::Borough)?);
    let years: Vec<String> = dashboard
        .year_options()?
        .iter()
        .map(i32::to_string)
        .collect();
    print_list("Years", &years);
    print_list("Vehicle types", &dashboard.options(Role::VehicleType)?);
    print_list("Contributing factors", &dashboard.options(Role::Factor)?);
    print_list("Age groups", &dashboard.age_group_options()?);
    Ok(())
}

fn print_list(title: &str, values: &[String]) {
    println!("{}:", title);
    for value in values {
        println!("  {}", value);
    }
}

fn print_report(bundle: &ResultBundle) {
    println!("{}", bundle.kpi_sentence());
    println!();
    print_counts("Crashes by borough", &bundle.borough_counts);
    print_trend(&bundle.yearly_trend);
    print_matrix(&bundle.hour_weekday);
    print_geo(&bundle.geo);
    print_counts("Injury outcomes", &bundle.injuries);
}

fn print_counts(title: &str, result: &AggregateResult<Vec<CategoryCount>>) {
    println!("{}:", title);
    match result {
        AggregateResult::Ready(counts) => {
            for entry in counts {
                println!("  {}: {}", entry.label, entry.count);
            }
        }
        AggregateResult::Placeholder(reason) => println!("  {}", reason),
    }
    println!();
}

fn print_trend(result: &AggregateResult<Vec<TrendPoint>>) {
    println!("Crashes by year:");
    match result {
        AggregateResult::Ready(points) => {
            for point in points {
                println!("  {}: {}", point.year, point.count);
            }
        }
        AggregateResult::Placeholder(reason) => println!("  {}", reason),
    }
    println!();
}

fn print_matrix(result: &AggregateResult<HourWeekdayMatrix>) {
    println!("Crashes by weekday and hour:");
    match result {
        AggregateResult::Ready(matrix) => {
            for (row, weekday) in matrix.weekdays.iter().enumerate() {
                let cells: Vec<String> = matrix
                    .hours
                    .iter()
                    .zip(&matrix.counts[row])
                    .map(|(hour, count)| format!("{:02}h={}", hour, count))
                    .collect();
                println!("  {}: {}", weekday, cells.join(" "));
            }
        }
        AggregateResult::Placeholder(reason) => println!("  {}", reason),
    }
    println!();
}

fn print_geo(result: &AggregateResult<GeoSample>) {
    println!("Mapped locations:");
    match result {
        AggregateResult::Ready(sample) => {
            if sample.sampled {
                println!(
                    "  {} of {} geolocated records (deterministic sample)",
                    sample.points.len(),
                    sample.total_located
                );
            } else {
                println!("  {} geolocated records", sample.points.len());
            }
        }
        AggregateResult::Placeholder(reason) => println!("  {}", reason),
    }
    println!();
}
