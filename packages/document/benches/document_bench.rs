use criterion::{black_box, criterion_group, criterion_main, Criterion};
use scribe_document::{deserialize, plain_text, serialize, Point, Range};

fn sample_content(paragraphs: usize) -> String {
    let blocks: Vec<String> = (0..paragraphs)
        .map(|i| {
            if i % 5 == 4 {
                format!(
                    r#"{{"type":"bulleted-list","children":[{{"type":"list-item","children":[{{"text":"item {}"}}]}}]}}"#,
                    i
                )
            } else {
                format!(
                    r#"{{"type":"paragraph","children":[{{"text":"Paragraph {} "}},{{"text":"bold","bold":true}},{{"type":"link","url":"https://example.com/{}","children":[{{"text":"link"}}]}}]}}"#,
                    i, i
                )
            }
        })
        .collect();
    format!("[{}]", blocks.join(","))
}

fn deserialize_document(c: &mut Criterion) {
    let content = sample_content(200);

    c.bench_function("deserialize_200_blocks", |b| {
        b.iter(|| deserialize(black_box(&content)))
    });
}

fn serialize_document(c: &mut Criterion) {
    let doc = deserialize(&sample_content(200));

    c.bench_function("serialize_200_blocks", |b| b.iter(|| serialize(black_box(&doc))));
}

fn plain_text_document(c: &mut Criterion) {
    let doc = deserialize(&sample_content(200));

    c.bench_function("plain_text_200_blocks", |b| b.iter(|| plain_text(black_box(&doc))));
}

fn bold_whole_document(c: &mut Criterion) {
    let doc = deserialize(&sample_content(200));
    let range = Range::new(doc.start(), doc.end());

    c.bench_function("update_marks_200_blocks", |b| {
        b.iter(|| {
            let mut doc = doc.clone();
            doc.update_marks(black_box(&range), |marks| marks.bold = true);
            doc
        })
    });
}

fn fallback_plain_text(c: &mut Criterion) {
    let raw = "plain notes ".repeat(500);

    c.bench_function("deserialize_fallback", |b| b.iter(|| deserialize(black_box(&raw))));
}

fn resolve_points(c: &mut Criterion) {
    let doc = deserialize(&sample_content(200));
    let stale = Point::new(vec![150, 9, 9], 4);

    c.bench_function("resolve_stale_point", |b| {
        b.iter(|| doc.resolve_point(black_box(&stale)))
    });
}

criterion_group!(
    benches,
    deserialize_document,
    serialize_document,
    plain_text_document,
    bold_whole_document,
    fallback_plain_text,
    resolve_points
);
criterion_main!(benches);
