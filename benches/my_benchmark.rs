use criterion::{criterion_group, criterion_main, Criterion, BenchmarkId};
use crossword_layout::{generator::{CrosswordGenerationRequest, CrosswordGenerator, CrosswordGeneratorSettings}, word::Word};
use tokio::runtime::Builder;
use tokio_stream::StreamExt;

fn generator() -> CrosswordGenerator<u8, String>
{
    let mut generator = CrosswordGenerator::<u8, String>::default();
    generator.settings = CrosswordGeneratorSettings { seed: Some(17), ..Default::default() };
    generator.words = vec![("Hello", "greeting"), ("world", "planet"), ("sesame", "seed"), ("myname", "introduction"),
                           ("yellow", "color"), ("mellow", "calm"), ("meadow", "field"), ("window", "glass pane")]
        .into_iter()
        .map(|(w, d)| Word::new(w.to_lowercase(), d))
        .collect();
    generator
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("crossword");

    group.bench_function(BenchmarkId::new("Single", ""),
        |b| b.iter(||
        {
            generator().generate().unwrap()
        }));

    group.bench_function(BenchmarkId::new("Stream", ""),
        |b| b.iter(||
        {
            let generator = generator();
            let rt = Builder::new_current_thread().build().unwrap();

            rt.block_on(async move
            {
                let mut str = generator.crossword_stream();
                str.request_crossword(CrosswordGenerationRequest::Count(10)).await;
                str.request_crossword(CrosswordGenerationRequest::Stop).await;
                while let Some(_) = str.next().await {}
            });
        }));

    group.finish();

}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
