//! Cross-page decisions and merges through the public API.

use tablestitch_core::combine::{
    CombineDecision, CombineVeto, CrossPageCombiner, SplitCellScorer, can_combine, edit_similarity, judge,
};
use tablestitch_core::page::PageContext;
use tablestitch_core::params::CombineParams;
use tablestitch_core::table::{BBox, CrossPageRow, Table, TableType, TextChunk};

fn page(number: usize) -> PageContext {
    PageContext {
        text_bounds: BBox::new(50.0, 50.0, 550.0, 750.0),
        chunks: vec![TextChunk::new(BBox::new(250.0, 20.0, 350.0, 30.0), "某某股份有限公司")],
        ..PageContext::new(number, 600.0, 800.0)
    }
}

fn fragment(page: usize, top: f64, rows: &[Vec<&str>]) -> Table {
    let bottom = top + 20.0 * rows.len() as f64;
    Table::from_text_rows(page, BBox::new(50.0, top, 550.0, bottom), rows)
}

fn worked_example() -> (Table, Table) {
    let prev = fragment(1, 660.0, &[vec!["项目", "2016"], vec!["A", "10"], vec!["B", "20"]]);
    let next = fragment(2, 60.0, &[vec!["项目", "2016"], vec!["C", "30"]]);
    (prev, next)
}

#[test]
fn test_worked_example_combines() {
    let (prev, next) = worked_example();
    let params = CombineParams::default();
    assert!(can_combine(&prev, &next, &page(1), &page(2), &params));

    let mut combiner = CrossPageCombiner::new(params);
    assert!(combiner.push_page(&page(1), vec![prev]).is_empty());
    assert!(combiner.push_page(&page(2), vec![next]).is_empty());
    let table = combiner.finish().unwrap();

    assert_eq!((table.row_count(), table.column_count()), (4, 2));
    assert_eq!(
        table.text_grid(),
        vec![vec!["项目", "2016"], vec!["A", "10"], vec!["B", "20"], vec!["C", "30"]]
    );
    assert_eq!((table.page_number, table.end_page_number), (1, 2));
    assert_eq!(table.cell(2, 0).unwrap().cross_page_row(), Some(CrossPageRow::LastRow));
    assert_eq!(table.cell(3, 0).unwrap().cross_page_row(), Some(CrossPageRow::FirstRow));
}

#[test]
fn test_row_count_after_combine() {
    // 3 + 3 rows with one repeated header row.
    let prev = fragment(1, 640.0, &[vec!["项目", "2016"], vec!["A", "10"], vec!["B", "20"]]);
    let next = fragment(2, 60.0, &[vec!["项目", "2016"], vec!["C", "30"], vec!["D", "40"]]);
    let mut combiner = CrossPageCombiner::new(CombineParams::default());
    combiner.push_page(&page(1), vec![prev]);
    combiner.push_page(&page(2), vec![next]);
    let table = combiner.finish().unwrap();
    assert_eq!(table.row_count(), 3 + 3 - 1);
}

#[test]
fn test_body_text_between_tables_blocks_combine() {
    let (prev, next) = worked_example();
    let mut next_page = page(2);
    next_page.chunks.push(TextChunk::new(
        BBox::new(60.0, 52.0, 540.0, 58.0),
        "本公司报告期内主要子公司及参股公司情况如下",
    ));
    let params = CombineParams::default();
    assert_eq!(
        judge(&prev, &next, &page(1), &next_page, &params),
        CombineDecision::BodyText
    );
    assert!(!can_combine(&prev, &next, &page(1), &next_page, &params));

    let mut combiner = CrossPageCombiner::new(params);
    combiner.push_page(&page(1), vec![prev]);
    let out = combiner.push_page(&next_page, vec![next]);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].row_count(), 3);
}

#[test]
fn test_vetoes_are_reported() {
    let (prev, next) = worked_example();
    let params = CombineParams::default();

    let english = PageContext {
        chunks: vec![TextChunk::new(BBox::new(250.0, 20.0, 350.0, 30.0), "Annual Report")],
        ..page(2)
    };
    assert_eq!(
        judge(&prev, &next, &page(1), &english, &params),
        CombineDecision::Vetoed(CombineVeto::NotChinese)
    );

    let landscape = PageContext {
        height: 600.0,
        ..page(2)
    };
    assert_eq!(
        judge(&prev, &next, &page(1), &landscape, &params),
        CombineDecision::Vetoed(CombineVeto::PageHeightMismatch)
    );

    let mut ruled_vs_unruled = next.clone();
    ruled_vs_unruled.table_type = TableType::Unruled;
    assert_eq!(
        judge(&prev, &ruled_vs_unruled, &page(1), &page(2), &params),
        CombineDecision::Vetoed(CombineVeto::TableTypeMismatch)
    );
}

#[test]
fn test_unruled_pair_stays_separate() {
    let (mut prev, mut next) = worked_example();
    prev.table_type = TableType::Unruled;
    next.table_type = TableType::Unruled;
    let params = CombineParams::default();
    assert_eq!(
        judge(&prev, &next, &page(1), &page(2), &params),
        CombineDecision::Vetoed(CombineVeto::Unruled)
    );

    let mut combiner = CrossPageCombiner::new(params);
    let mut tables = combiner.push_page(&page(1), vec![prev]);
    tables.extend(combiner.push_page(&page(2), vec![next]));
    tables.extend(combiner.finish());
    assert_eq!(tables.len(), 2);
    assert_eq!(tables.iter().map(Table::row_count).sum::<usize>(), 5);
    assert_eq!(tables[1].text_grid(), vec![vec!["项目", "2016"], vec!["C", "30"]]);
    assert!(tables.iter().all(|t| t.merged_fragments.is_empty()));
}

#[test]
fn test_merged_fragments_are_kept() {
    let (prev, next) = worked_example();
    let mut combiner = CrossPageCombiner::new(CombineParams::default());
    combiner.push_page(&page(1), vec![prev]);
    combiner.push_page(&page(2), vec![next.clone()]);
    let table = combiner.finish().unwrap();

    assert_eq!(table.row_count(), 4);
    assert_eq!(table.merged_fragments.len(), 1);
    let fragment = &table.merged_fragments[0];
    assert_eq!(fragment.page_number, 2);
    assert_eq!(fragment.bbox, next.bbox);
    assert_eq!(fragment.text_grid(), next.text_grid());
}

#[test]
fn test_different_shapes_do_not_combine() {
    let prev = fragment(1, 660.0, &[vec!["名称", "说明"], vec!["甲", "文字"]]);
    let next = Table::from_text_rows(
        2,
        BBox::new(50.0, 60.0, 350.0, 100.0),
        &[vec!["序号", "单位", "金额", "备注"], vec!["1", "元", "30", "无"]],
    );
    assert!(!can_combine(&prev, &next, &page(1), &page(2), &CombineParams::default()));
}

#[test]
fn test_edit_similarity_properties() {
    let samples = ["", "项目", "项目2016", "营业收入", "abc", "abd"];
    for a in samples {
        assert_eq!(edit_similarity(a, a), 1.0);
        for b in samples {
            let s = edit_similarity(a, b);
            assert!((0.0..=1.0).contains(&s));
            assert_eq!(s, edit_similarity(b, a));
        }
    }
}

struct JoinAll;

impl SplitCellScorer for JoinAll {
    fn score(&self, pairs: &[(String, String)]) -> Vec<(f32, i64)> {
        pairs.iter().map(|_| (0.95, 1)).collect()
    }
}

#[test]
fn test_scorer_repairs_split_row() {
    let prev = fragment(1, 660.0, &[vec!["项目", "说明"], vec!["募集资金用于", "补充"]]);
    let next = fragment(2, 60.0, &[vec!["补充流动资金", "流动资金"], vec!["其他", "无"]]);
    let params = CombineParams::default();
    assert!(can_combine(&prev, &next, &page(1), &page(2), &params));

    let scorer = JoinAll;
    let mut combiner = CrossPageCombiner::new(params).with_scorer(&scorer);
    combiner.push_page(&page(1), vec![prev]);
    combiner.push_page(&page(2), vec![next]);
    let table = combiner.finish().unwrap();
    assert_eq!(table.row_count(), 3);
    assert_eq!(table.cell(1, 0).unwrap().text(), "募集资金用于补充流动资金");
    assert!(table.cell(1, 0).unwrap().is_cross_page_cell());
}
