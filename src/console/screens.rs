//! # Screens
//!
//! The app's menu tree. Each function builds a fresh [`Menu`], runs it, and
//! drops it when the user leaves:
//!
//! ```text
//! Main ─ Data Services ─┬─ Get Gene Set from Product ─ <product> ─ View / Export
//!                       └─ Get Section Datasets by Reference Space ─ <space>
//!                                  └─ View / Export IDs / Export Grid Expression Data
//! ```
//!
//! Actions capture the shared [`AppContext`] by reference and receive the
//! console on each call.

use std::error::Error;
use std::io;

use log::{debug, info};

use super::Console;
use super::menu::{Menu, MenuOptions, MenuOutcome};
use crate::atlas::{AmbaProduct, Gene, Measurement, ReferenceSpace, SectionDataSet};
use crate::core::context::AppContext;
use crate::core::format::comma_separated;
use crate::services::DatasetFilter;
use crate::services::export::{file_stem, grid_column_names, grid_columns};

type ScreenResult = Result<(), Box<dyn Error>>;

fn count(n: usize) -> String {
    comma_separated(n as u64)
}

pub fn main_menu(ctx: &AppContext, console: &mut Console) -> io::Result<MenuOutcome> {
    let options = MenuOptions::new().add("Data Services", |console| {
        data_services_menu(ctx, console)?;
        Ok(())
    });

    Menu::new(options)
        .include_exit(true)
        .include_back(false)
        .page_size(ctx.config.page_size)
        .run(console)
}

pub fn data_services_menu(ctx: &AppContext, console: &mut Console) -> io::Result<MenuOutcome> {
    let options = MenuOptions::new()
        .add("Get Gene Set from Product", |console| product_menu(ctx, console))
        .add("Get Section Datasets by Reference Space", |console| {
            reference_space_menu(ctx, console)
        });

    Menu::new(options)
        .prompt("What would you like to do with the Data Retrieval Service?")
        .page_size(ctx.config.page_size)
        .run(console)
}

fn product_menu(ctx: &AppContext, console: &mut Console) -> ScreenResult {
    let products = ctx.catalog.brain_atlas_products();
    if products.is_empty() {
        console
            .printer
            .warning("No brain atlas products are available. Check the product catalog.")?;
        return Ok(());
    }

    let options = products.into_iter().fold(MenuOptions::new(), |options, product| {
        options.add(product.name.clone(), move |console| geneset_screen(ctx, console, product))
    });

    Menu::new(options)
        .prompt("Which AMBA product would you like to retrieve a gene set from?")
        .stop_on_selection(true)
        .page_size(ctx.config.page_size)
        .run(console)?;
    Ok(())
}

fn geneset_screen(ctx: &AppContext, console: &mut Console, product: &AmbaProduct) -> ScreenResult {
    console
        .printer
        .info(&format!("Retrieving gene set for {}...", product.name))?;
    let Some(genes) = ctx.retrieval.geneset_from_product(product.id) else {
        console.printer.error(&format!(
            "Could not retrieve the gene set for {}. See the log for details.",
            product.name
        ))?;
        return Ok(());
    };

    console.printer.success(&format!(
        "{} genes found in {} with ID {}",
        count(genes.len()),
        product.name,
        product.id
    ))?;

    let file_name = format!("{}_geneset.txt", file_stem(&product.abbreviation));
    let options = MenuOptions::new()
        .add("View Genes", |console| view_genes(console, &genes))
        .add("Export Genes", |console| {
            let path = ctx.exporter.save_geneset_to_file(&genes, &file_name)?;
            console
                .printer
                .success(&format!("Genes exported to {}", path.display()))?;
            Ok(())
        });

    Menu::new(options)
        .prompt("What would you like to do with the gene set?")
        .page_size(ctx.config.page_size)
        .run(console)?;
    Ok(())
}

fn view_genes(console: &mut Console, genes: &[Gene]) -> ScreenResult {
    for gene in genes {
        console
            .printer
            .print(&format!("{:<12} {}", gene.acronym, gene.name))?;
    }
    console
        .printer
        .info(&format!("{} genes", count(genes.len())))?;
    Ok(())
}

fn reference_space_menu(ctx: &AppContext, console: &mut Console) -> ScreenResult {
    console.printer.info("Retrieving reference spaces...")?;
    let Some(spaces) = ctx.retrieval.reference_spaces() else {
        console
            .printer
            .error("Could not retrieve reference spaces. See the log for details.")?;
        return Ok(());
    };

    let options = spaces.iter().fold(MenuOptions::new(), |options, space| {
        options.add(format!("{} (ID {})", space.name, space.id), move |console| {
            section_dataset_screen(ctx, console, space)
        })
    });

    Menu::new(options)
        .prompt("Which reference space would you like to retrieve section datasets from?")
        .stop_on_selection(true)
        .page_size(ctx.config.page_size)
        .run(console)?;
    Ok(())
}

fn section_dataset_screen(
    ctx: &AppContext,
    console: &mut Console,
    space: &ReferenceSpace,
) -> ScreenResult {
    let Some(expression_only) = console.read_yes_no("Only keep datasets flagged with expression?")?
    else {
        return Ok(());
    };
    let Some(plane) = console.read_int("Plane of section id, 1 coronal or 2 sagittal (0 for any): ")?
    else {
        return Ok(());
    };
    let filter = DatasetFilter {
        expression_only,
        plane_of_section_id: (plane > 0).then_some(plane),
    };

    console
        .printer
        .info(&format!("Retrieving section datasets for {}...", space.name))?;
    let Some(datasets) = ctx.retrieval.section_datasets(space.id, None, &filter) else {
        console.printer.error(&format!(
            "Could not retrieve section datasets for {}. See the log for details.",
            space.name
        ))?;
        return Ok(());
    };

    if datasets.is_empty() {
        console
            .printer
            .warning(&format!("No section datasets found for {}.", space.name))?;
        return Ok(());
    }
    console.printer.success(&format!(
        "{} section datasets found in {} with ID {}",
        count(datasets.len()),
        space.name,
        space.id
    ))?;

    let stem = format!("reference_space_{}", space.id);
    let ids: Vec<i64> = datasets.iter().map(|dataset| dataset.id).collect();
    let options = MenuOptions::new()
        .add("View Section Dataset IDs", |console| view_datasets(console, &datasets))
        .add("Export Section Dataset IDs", |console| {
            let path = ctx
                .exporter
                .save_section_dataset_ids_to_file(&ids, &format!("{stem}_section_datasets.txt"))?;
            console
                .printer
                .success(&format!("Section dataset IDs exported to {}", path.display()))?;
            Ok(())
        })
        .add("Export Grid Expression Data", |console| {
            export_grid_expression(ctx, console, &datasets, &stem)
        });

    Menu::new(options)
        .prompt("What would you like to do with the section datasets?")
        .page_size(ctx.config.page_size)
        .run(console)?;
    Ok(())
}

fn view_datasets(console: &mut Console, datasets: &[SectionDataSet]) -> ScreenResult {
    for dataset in datasets {
        console.printer.print(&format!(
            "{:<12} {}",
            dataset.id,
            dataset.primary_gene().unwrap_or("-")
        ))?;
    }
    Ok(())
}

/// Asks which measurements to export, downloads grid data for every dataset,
/// and writes one CSV per measurement.
fn export_grid_expression(
    ctx: &AppContext,
    console: &mut Console,
    datasets: &[SectionDataSet],
    stem: &str,
) -> ScreenResult {
    let valid: Vec<&str> = Measurement::ALL.iter().map(Measurement::as_str).collect();
    let Some(names) = console.read_comma_separated(
        &format!("Measurement types ({}): ", valid.join(", ")),
        Some(valid.as_slice()),
    )?
    else {
        return Ok(());
    };

    let mut measurements = names
        .iter()
        .map(|name| name.parse::<Measurement>())
        .collect::<Result<Vec<_>, _>>()?;
    measurements.sort();
    measurements.dedup();

    let question = format!(
        "Download grid data for {} section datasets?",
        count(datasets.len())
    );
    if console.read_yes_no(&question)? != Some(true) {
        debug!("Grid export cancelled");
        return Ok(());
    }

    let Some(grids) = ctx.retrieval.grid_expression(datasets, &measurements) else {
        console
            .printer
            .error("Could not retrieve grid expression data. See the log for details.")?;
        return Ok(());
    };

    let names = grid_column_names(datasets);
    for measurement in measurements {
        let columns = grid_columns(&names, &grids, measurement);
        let path = ctx.exporter.save_grid_expression_csv(
            measurement,
            &columns,
            &format!("{stem}_{measurement}.csv"),
        )?;
        info!("Exported {} grid data to {}", measurement, path.display());
        console
            .printer
            .success(&format!("{} data exported to {}", measurement, path.display()))?;
    }
    Ok(())
}
