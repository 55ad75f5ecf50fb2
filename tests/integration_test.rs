use fipi_question_parser::orchestrator::parse_page;
use fipi_question_parser::{
    logger, App, Config, MemoryStore, PageRequest, PageScraper, QuestionOption, SolutionType, TomlStore,
};
use std::path::PathBuf;
use std::sync::Arc;

/// 一个接近真实题库列表页的片段：两道题 + 一个没有 ID 的坏块
const PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>Банк заданий</title></head>
<body>
<div id="questions">
  <div class="qblock" id="q1">
    <input type="hidden" name="guid" value="0A1B2C">
    <div class="hint">Задание №3. Решите неравенство</div>
    <table><tr><td class="cell_0">
      <p>Решите неравенство <math><mi>x</mi><mo>&lt;</mo><mfrac><mn>1</mn><mn>2</mn></mfrac></math>.</p>
      <table>
        <tr><td>x</td><td>1</td></tr>
        <tr><td>y</td><td>2</td></tr>
      </table>
      <script>ShowPictureQ('docs/0A1B2C/innerimg1.png')</script>
    </td></tr></table>
    <table class="distractors-table">
      <tr><td>1)</td><td><math><mi>x</mi><mo>&lt;</mo><mn>0</mn></math></td></tr>
      <tr><td>2)</td><td>решений нет</td></tr>
    </table>
  </div>
  <div class="iblock">
    <span class="canselect">0A1B2C</span>
    <table>
      <tr><td class="param-name">КЭС:</td><td><div>2.1 Неравенства</div><div>9.9 Неизвестно</div></td></tr>
      <tr><td class="param-name">Тип ответа:</td><td>Выбор ответа из предложенных вариантов</td></tr>
    </table>
  </div>

  <div class="qblock" id="q2">
    <div class="hint">Задание №4. Без идентификатора</div>
  </div>
  <div class="iblock"><span class="canselect">???</span></div>

  <div class="qblock" id="q3">
    <input type="hidden" name="guid" value="D4E5F6">
    <div class="hint">Найдите значение выражения</div>
    <table><tr><td class="cell_0">
      <table><tr><td>Вычислите</td><td>2 + 2</td></tr></table>
    </td></tr></table>
  </div>
  <div class="iblock">
    <span class="canselect">D4E5F6</span>
    <table>
      <tr><td class="param-name">Тип ответа:</td><td>Краткий ответ</td></tr>
    </table>
  </div>
</div>
</body></html>"#;

fn request(page_index: usize) -> PageRequest {
    PageRequest {
        page_index,
        page_size: 10,
        topic_filter: None,
        grade: Some("9".to_string()),
    }
}

fn temp_folder(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("fipi_it_{}_{}", name, std::process::id()))
}

#[test]
fn test_parse_realistic_page() {
    let (questions, found) = parse_page(PAGE, &request(0));
    assert_eq!(found, 3);
    assert_eq!(questions.len(), 2);

    let first = &questions[0];
    assert_eq!(first.id(), "0A1B2C");
    assert_eq!(first.qblock.prompt, "Решите неравенство");
    assert_eq!(first.qblock.exam_position, Some(3));
    assert_eq!(first.source_position, Some(1));
    assert_eq!(
        first.qblock.body,
        "Решите неравенство $x<\\dfrac{1}{2}$ .\n\n|   |   |\n| --- | --- |\n| x | 1 |\n| y | 2 |"
    );
    assert_eq!(
        first.qblock.attachments,
        vec!["https://oge.fipi.ru/bank/docs/0A1B2C/innerimg1.png"]
    );
    assert_eq!(
        first.qblock.options,
        vec![
            QuestionOption::new("1", "$x<0$"),
            QuestionOption::new("2", "решений нет"),
        ]
    );
    assert_eq!(first.iblock.solution_type, SolutionType::MultiChoice);
    assert_eq!(first.iblock.topic_ids, vec!["2.1", "9.9"]);

    // 题干只有一个表格：按排版容器展开，不输出 Markdown 表格
    let second = &questions[1];
    assert_eq!(second.id(), "D4E5F6");
    assert_eq!(second.qblock.body, "Вычислите 2 + 2");
    assert_eq!(second.qblock.exam_position, None);
    assert_eq!(second.source_position, Some(3));
    assert_eq!(second.iblock.solution_type, SolutionType::Short);
}

#[tokio::test]
async fn test_scrape_into_memory_store() {
    let store = Arc::new(MemoryStore::with_topics(["2.1"]));
    let scraper = PageScraper::new(store.clone(), 25);

    let stats = scraper.scrape(PAGE, &request(0)).await.unwrap();
    assert_eq!(stats.found, 3);
    assert_eq!(stats.parsed, 2);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.created, 2);

    let record = store.get("0A1B2C").await.unwrap();
    assert_eq!(record.topic_ids, vec!["2.1"]);
    assert_eq!(record.exam_position, Some(3));
    assert_eq!(record.name, "0A1B2C");

    // 同一页出现在后面的页码：只更新序号
    let stats = scraper.scrape(PAGE, &request(4)).await.unwrap();
    assert_eq!(stats.updated, 2);
    assert_eq!(stats.created, 0);
    assert_eq!(store.get("D4E5F6").await.unwrap().source_position, Some(43));
    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn test_scrape_into_toml_store() {
    let folder = temp_folder("toml");
    std::fs::create_dir_all(&folder).unwrap();
    std::fs::write(folder.join("topics.toml"), "topics = [\"2.1\"]\n").unwrap();

    let store = Arc::new(TomlStore::new(&folder));
    let scraper = PageScraper::new(store.clone(), 30);
    let stats = scraper.scrape(PAGE, &request(0)).await.unwrap();
    assert_eq!(stats.created, 2);

    let record = store.load("0A1B2C").await.unwrap().unwrap();
    assert_eq!(record.solution_type, SolutionType::MultiChoice);
    assert_eq!(record.topic_ids, vec!["2.1"]);
    assert_eq!(record.options.len(), 2);

    let _ = std::fs::remove_dir_all(&folder);
}

#[tokio::test]
async fn test_app_processes_html_folder() {
    // 初始化日志
    logger::init();

    let root = temp_folder("app");
    let html_folder = root.join("pages");
    let store_folder = root.join("store");
    std::fs::create_dir_all(&html_folder).unwrap();
    std::fs::write(html_folder.join("page_001.html"), PAGE).unwrap();

    let config = Config {
        html_folder: html_folder.to_string_lossy().to_string(),
        store_folder: store_folder.to_string_lossy().to_string(),
        output_log_file: root.join("output.txt").to_string_lossy().to_string(),
        ..Config::default()
    };

    let stats = App::initialize(config).await.unwrap().run().await.unwrap();
    assert_eq!(stats.created, 2);
    assert!(store_folder.join("questions").join("0A1B2C.toml").exists());
    assert!(store_folder.join("questions").join("D4E5F6.toml").exists());

    let _ = std::fs::remove_dir_all(&root);
}
