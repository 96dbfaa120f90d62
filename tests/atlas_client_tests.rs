use std::io::{Cursor, Write};

use brainstem::atlas::{AtlasClient, AtlasError, Measurement};
use serde_json::{json, Value};
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};
use zip::write::SimpleFileOptions;

// ============================================================================
// Helper Functions
// ============================================================================

fn gene_json(id: i64, acronym: &str) -> Value {
    json!({
        "acronym": acronym,
        "alias_tags": null,
        "chromosome_id": 35,
        "ensembl_id": null,
        "entrez_id": 11287,
        "genomic_reference_update_id": 491928275,
        "homologene_id": 37350,
        "id": id,
        "legacy_ensembl_gene_id": null,
        "name": format!("{acronym} gene"),
        "organism_id": 2,
        "original_name": format!("{acronym} gene"),
        "original_symbol": acronym,
        "reference_genome_id": null,
        "sphinx_id": id,
        "version_status": "no change"
    })
}

fn dataset_json(id: i64, genes: &[Value]) -> Value {
    json!({
        "blue_channel": null,
        "delegate": true,
        "expression": true,
        "failed": false,
        "failed_facet": 734881840,
        "green_channel": null,
        "id": id,
        "name": null,
        "plane_of_section_id": 1,
        "qc_date": "2009-05-28T19:26:56Z",
        "red_channel": null,
        "reference_space_id": 9,
        "rnaseq_design_id": null,
        "section_thickness": 25,
        "specimen_id": 70813257,
        "sphinx_id": 169958,
        "storage_directory": "/external/aibs/prod/",
        "weight": 5270,
        "genes": genes
    })
}

fn success(msg: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "success": true,
        "id": 0,
        "start_row": 0,
        "num_rows": msg.as_array().map_or(0, Vec::len),
        "total_rows": msg.as_array().map_or(0, Vec::len),
        "msg": msg
    }))
}

/// Zip archive with one little-endian `.raw` volume per entry.
fn grid_archive(files: &[(&str, &[f32])]) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut buffer);
        for (name, voxels) in files {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            for v in *voxels {
                writer.write_all(&v.to_le_bytes()).unwrap();
            }
        }
        writer.finish().unwrap();
    }
    buffer.into_inner()
}

// ============================================================================
// Model Queries
// ============================================================================

#[tokio::test]
async fn test_genes_for_product_sends_criteria() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/data/Gene/query.json"))
        .and(query_param("criteria", "products[id$eq1]"))
        .and(query_param("num_rows", "all"))
        .respond_with(success(json!([gene_json(11, "Pzp"), gene_json(12, "Aco2")])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = AtlasClient::new(format!("{}/", mock_server.uri()));
    let genes = client.genes_for_product(1).await.unwrap();

    let acronyms: Vec<&str> = genes.iter().map(|g| g.acronym.as_str()).collect();
    assert_eq!(acronyms, vec!["Pzp", "Aco2"]);
}

#[tokio::test]
async fn test_section_datasets_include_genes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/data/SectionDataSet/query.json"))
        .and(query_param("criteria", "reference_space[id$eq9]"))
        .and(query_param("include", "genes"))
        .respond_with(success(json!([
            dataset_json(100, &[gene_json(11, "Pzp")]),
            dataset_json(101, &[]),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = AtlasClient::new(mock_server.uri());
    let datasets = client.section_datasets(9, None).await.unwrap();

    assert_eq!(datasets.len(), 2);
    assert_eq!(datasets[0].primary_gene(), Some("Pzp"));
    assert_eq!(datasets[1].primary_gene(), None);
}

#[tokio::test]
async fn test_missing_msg_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/data/ReferenceSpace/query.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "msg": "Data Access error in query"
        })))
        .mount(&mock_server)
        .await;

    let client = AtlasClient::new(mock_server.uri());
    let result = client.reference_spaces().await;

    assert!(matches!(result, Err(AtlasError::MissingMsg(_))));
}

#[tokio::test]
async fn test_http_error_maps_to_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/data/Product/query.json"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let client = AtlasClient::new(mock_server.uri());
    match client.products().await {
        Err(AtlasError::Api { status, message }) => {
            assert_eq!(status, 500);
            assert!(message.contains("Internal Server Error"));
        }
        other => panic!("Expected Api error, got {:?}", other.map(|p| p.len())),
    }
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let client = AtlasClient::new("http://127.0.0.1:9");
    let result = client.reference_spaces().await;
    assert!(matches!(result, Err(AtlasError::Network(_))));
}

// ============================================================================
// Grid Downloads
// ============================================================================

#[tokio::test]
async fn test_grid_expression_decodes_requested_volumes() {
    let mock_server = MockServer::start().await;
    let archive = grid_archive(&[
        ("energy.raw", &[0.5, 1.5, -1.0]),
        ("density.raw", &[0.0, 2.0, 4.0]),
    ]);

    Mock::given(method("GET"))
        .and(path("/grid_data/download/100"))
        .and(query_param("include", "energy,density"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(archive))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = AtlasClient::new(mock_server.uri());
    let grid = client
        .grid_expression(100, &[Measurement::Energy, Measurement::Density])
        .await
        .unwrap();

    assert_eq!(grid.section_dataset_id, 100);
    assert_eq!(grid.volume(Measurement::Energy), Some(&[0.5, 1.5, -1.0][..]));
    assert_eq!(grid.volume(Measurement::Density), Some(&[0.0, 2.0, 4.0][..]));
    assert_eq!(grid.volume(Measurement::Intensity), None);
}

#[tokio::test]
async fn test_grid_expression_missing_volume_is_archive_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/grid_data/download/100"))
        .respond_with(
            ResponseTemplate::new(200).set_body_bytes(grid_archive(&[("energy.raw", &[1.0])])),
        )
        .mount(&mock_server)
        .await;

    let client = AtlasClient::new(mock_server.uri());
    let result = client
        .grid_expression(100, &[Measurement::Intensity])
        .await;

    assert!(matches!(result, Err(AtlasError::Archive(_))));
}

#[tokio::test]
async fn test_grid_expression_not_a_zip() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/grid_data/download/7"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not a zip"))
        .mount(&mock_server)
        .await;

    let client = AtlasClient::new(mock_server.uri());
    let result = client.grid_expression(7, &[Measurement::Energy]).await;

    assert!(matches!(result, Err(AtlasError::Archive(_))));
}
