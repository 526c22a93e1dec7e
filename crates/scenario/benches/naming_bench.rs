//! 파일명 전략 및 렌더링 벤치마크
//!
//! 포트 목록 크기별 파일명 계산과 템플릿 미리보기 성능을 측정합니다.

use std::path::Path;

use chaosgen_core::LabelSelector;
use chaosgen_scenario::naming::{canonical_json, port_descriptor};
use chaosgen_scenario::{CpuHog, NodeNetworkChaos, PodNetworkOutage, Scenario, ScenarioGenerator};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

fn outage_with_ports(count: u16) -> PodNetworkOutage {
    PodNetworkOutage {
        ingress_ports: (10000..10000 + count).collect(),
        egress_ports: (20000..20000 + count).collect(),
        label_selector: Some(LabelSelector::label("app", "rook-ceph-osd")),
        ..PodNetworkOutage::new("openshift-storage")
    }
}

fn bench_port_descriptor(c: &mut Criterion) {
    let mut group = c.benchmark_group("port_descriptor");
    for count in [5u16, 20, 21, 500] {
        let ports: Vec<u16> = (30000..30000 + count).rev().collect();
        group.throughput(Throughput::Elements(u64::from(count)));
        group.bench_with_input(BenchmarkId::from_parameter(count), &ports, |b, ports| {
            b.iter(|| port_descriptor(black_box("ingress"), black_box(ports)))
        });
    }
    group.finish();
}

fn bench_file_names(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_name");

    for count in [4u16, 20, 64] {
        let scenario = outage_with_ports(count);
        let config = scenario.build().unwrap();
        group.bench_with_input(
            BenchmarkId::new("pod_network_outage", count),
            &config,
            |b, config| b.iter(|| scenario.file_name(black_box(config))),
        );
    }

    let chaos = NodeNetworkChaos::default();
    let config = chaos.build().unwrap();
    group.bench_function("node_network_chaos", |b| {
        b.iter(|| chaos.file_name(black_box(&config)))
    });

    group.bench_function("canonical_json", |b| {
        let value = config.clone().into_value();
        b.iter(|| canonical_json(black_box(&value)))
    });

    group.finish();
}

fn bench_preview(c: &mut Criterion) {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../templates");
    let generator = ScenarioGenerator::new(root);
    let hog = CpuHog::default();

    c.bench_function("preview_cpu_hog", |b| {
        b.iter(|| generator.preview(black_box(&hog)).unwrap())
    });
}

criterion_group!(benches, bench_port_descriptor, bench_file_names, bench_preview);
criterion_main!(benches);
