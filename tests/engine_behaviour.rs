//! 文本替换引擎集成测试
//!
//! 覆盖快照幂等、往返恢复、缓存短路、失败隔离和排队语义

use std::time::Duration;

use textswap::translation::{
    lookup_fn, DelayedLookup, MemoryStore, NodeText, StaticTable, TextSwapEngine, TextTree,
    TranslationConfig, TranslationError, UiRegistry,
};

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::{registry_engine, scenario_table, texts_of, CountingLookup, FailingLookup};

/// Home/About/Contact 场景
#[tokio::test]
async fn test_home_about_contact_scenario() {
    let engine = registry_engine(&["Home", "About", "Contact"], scenario_table());

    let report = engine.translate_to("hi").await.expect("translate should succeed");
    assert_eq!(report.nodes_total, 3);
    assert_eq!(report.nodes_written, 3);
    assert!(report.is_complete());
    assert_eq!(texts_of(engine.tree()), vec!["मुख्य", "परिचय", "Contact"]);
    assert_eq!(engine.current_language(), "hi");

    let report = engine.translate_to("en").await.expect("restore should succeed");
    assert!(report.restored);
    assert_eq!(texts_of(engine.tree()), vec!["Home", "About", "Contact"]);
    assert_eq!(engine.current_language(), "en");

    println!("✅ Home/About/Contact 场景测试通过");
}

/// 快照幂等：重复调用不覆盖已有记录
#[tokio::test]
async fn test_snapshot_is_idempotent() {
    let engine = registry_engine(&["Home", "About"], scenario_table());
    let ids = engine.tree().eligible_nodes();

    assert_eq!(engine.snapshot_originals(), 2);
    let first: Vec<NodeText> = ids.iter().map(|id| engine.original(id).unwrap()).collect();

    assert_eq!(engine.snapshot_originals(), 0);
    let second: Vec<NodeText> = ids.iter().map(|id| engine.original(id).unwrap()).collect();
    assert_eq!(first, second);

    // 翻译之后再次快照，记录仍是原文
    engine.translate_to("hi").await.unwrap();
    assert_eq!(engine.snapshot_originals(), 0);
    let third: Vec<NodeText> = ids.iter().map(|id| engine.original(id).unwrap()).collect();
    assert_eq!(first, third);
    assert_eq!(engine.originals_len(), 2);

    println!("✅ 快照幂等测试通过");
}

/// 往返定律：包括空字符串和分隔符字符
#[tokio::test]
async fn test_round_trip_with_empty_and_delimiters() {
    let originals = ["", "a_b:c", "Home_hi", "  spaced out  ", "x:y_hi:z", "\n"];
    let upper = lookup_fn("upper", |text: &str, _lang: &str| Ok(text.to_uppercase()));
    let engine = registry_engine(&originals, upper);

    engine.translate_to("hi").await.unwrap();
    assert_eq!(
        texts_of(engine.tree()),
        vec!["", "A_B:C", "HOME_HI", "  SPACED OUT  ", "X:Y_HI:Z", "\n"]
    );

    // 重复切换到同一语言结果不变
    engine.translate_to("hi").await.unwrap();
    assert_eq!(texts_of(engine.tree())[1], "A_B:C");

    engine.translate_to("en").await.unwrap();
    assert_eq!(texts_of(engine.tree()), originals.to_vec());

    println!("✅ 往返恢复测试通过");
}

/// 缓存确定性：第二次解析不调用查询后端
#[tokio::test]
async fn test_cache_short_circuits_lookup() {
    let lookup = CountingLookup::new(scenario_table());
    let calls = lookup.counter();
    let engine = registry_engine(&[], lookup);

    let first = engine.resolve("Home", "hi").await.unwrap();
    let second = engine.resolve("Home", "hi").await.unwrap();
    assert_eq!(first, "मुख्य");
    assert_eq!(first, second);
    assert_eq!(calls.get(), 1);

    // 语言代码规范化后命中同一条目
    assert_eq!(engine.resolve("Home", " HI ").await.unwrap(), "मुख्य");
    assert_eq!(calls.get(), 1);

    let stats = engine.cache_stats();
    assert_eq!(stats.cache_hits, 2);
    assert_eq!(stats.cache_misses, 1);

    println!("✅ 缓存短路测试通过");
}

/// 重复翻译只查询一次
#[tokio::test]
async fn test_repeated_batches_reuse_cache() {
    let lookup = CountingLookup::new(scenario_table());
    let calls = lookup.counter();
    let engine = registry_engine(&["Home", "About", "Contact"], lookup);

    engine.translate_to("hi").await.unwrap();
    assert_eq!(calls.get(), 3);

    engine.translate_to("en").await.unwrap();
    engine.translate_to("hi").await.unwrap();
    assert_eq!(calls.get(), 3);
    assert_eq!(texts_of(engine.tree()), vec!["मुख्य", "परिचय", "Contact"]);

    println!("✅ 缓存复用测试通过");
}

/// 恒等回退：表中没有的文本原样返回
#[tokio::test]
async fn test_identity_fallback() {
    let engine = registry_engine(&[], StaticTable::builtin());

    assert_eq!(engine.resolve("Dashboard", "hi").await.unwrap(), "Dashboard");
    assert_eq!(engine.resolve("Home", "fr").await.unwrap(), "Home");
    assert_eq!(engine.resolve("Home", "hi").await.unwrap(), "मुख्य");

    println!("✅ 恒等回退测试通过");
}

/// 豁免节点既不进入快照也不被修改
#[tokio::test]
async fn test_exempt_nodes_are_invisible() {
    let registry = UiRegistry::new();
    let home = registry.register(NodeText::text("Home"));
    let brand = registry.register_exempt(NodeText::text("Home").with_title("About"));

    let engine = TextSwapEngine::new(
        registry,
        scenario_table(),
        MemoryStore::new(),
        TranslationConfig::default(),
    )
    .unwrap();

    let before = engine.tree().text(&brand);
    engine.translate_to("hi").await.unwrap();
    assert_eq!(engine.tree().text(&home).unwrap().text.as_deref(), Some("मुख्य"));
    assert_eq!(engine.tree().text(&brand), before);

    engine.restore_originals().await;
    assert_eq!(engine.tree().text(&brand), before);

    assert!(engine.original(&brand).is_none());
    assert!(engine.node_language(&brand).is_none());
    assert_eq!(engine.originals_len(), 1);

    println!("✅ 豁免节点测试通过");
}

/// 注销的节点不再占用原文记录和语言记录
#[tokio::test]
async fn test_unregistered_nodes_are_forgotten() {
    let engine = registry_engine(&[], scenario_table());

    for _ in 0..50 {
        let id = engine.tree().register(NodeText::text("Home"));
        engine.translate_to("hi").await.unwrap();
        assert_eq!(engine.node_language(&id).as_deref(), Some("hi"));
        assert_eq!(engine.originals_len(), 1);

        assert!(engine.tree().unregister(&id));
        let report = engine.translate_to("hi").await.unwrap();
        assert_eq!(report.nodes_total, 0);

        assert!(engine.original(&id).is_none());
        assert!(engine.node_language(&id).is_none());
        assert_eq!(engine.originals_len(), 0);
    }

    assert!(engine.tree().is_empty());

    println!("✅ 注销节点清理测试通过");
}

/// 单个节点失败不影响其他节点
#[tokio::test]
async fn test_partial_failure_isolation() {
    let engine = registry_engine(
        &["Home", "About", "Contact"],
        FailingLookup::new(scenario_table(), "About"),
    );
    let ids = engine.tree().eligible_nodes();

    let report = engine.translate_to("hi").await.expect("batch should not abort");
    assert_eq!(report.nodes_total, 3);
    assert_eq!(report.nodes_written, 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].id, ids[1]);
    assert_eq!(report.failed[0].text, "About");
    assert!(matches!(
        report.failed[0].error,
        TranslationError::LookupError(_)
    ));

    assert_eq!(texts_of(engine.tree()), vec!["मुख्य", "About", "Contact"]);
    assert_eq!(engine.node_language(&ids[0]).as_deref(), Some("hi"));
    assert_eq!(engine.node_language(&ids[1]).as_deref(), Some("en"));

    // 失败的查询不进入缓存，下次仍会重试
    assert!(engine.resolve("About", "hi").await.is_err());

    println!("✅ 失败隔离测试通过");
}

/// 节点的任一字段失败时整个节点保持原样
#[tokio::test]
async fn test_failing_attribute_keeps_node_unchanged() {
    let registry = UiRegistry::new();
    let node = registry.register(
        NodeText::text("Home")
            .with_title("About")
            .with_placeholder("Home"),
    );

    let engine = TextSwapEngine::new(
        registry,
        FailingLookup::new(scenario_table(), "About"),
        MemoryStore::new(),
        TranslationConfig::default(),
    )
    .unwrap();

    let report = engine.translate_to("hi").await.unwrap();
    assert_eq!(report.failed.len(), 1);

    let text = engine.tree().text(&node).unwrap();
    assert_eq!(text.text.as_deref(), Some("Home"));
    assert_eq!(text.title.as_deref(), Some("About"));
    assert_eq!(text.placeholder.as_deref(), Some("Home"));

    println!("✅ 字段失败测试通过");
}

/// 所有字段一起翻译
#[tokio::test]
async fn test_auxiliary_fields_translated() {
    let registry = UiRegistry::new();
    let id = registry.register(
        NodeText::text("Send")
            .with_placeholder("Ask something...")
            .with_title("Send")
            .with_aria_label("Contact"),
    );

    let engine = TextSwapEngine::new(
        registry,
        StaticTable::builtin(),
        MemoryStore::new(),
        TranslationConfig::default(),
    )
    .unwrap();

    engine.translate_to("hi").await.unwrap();
    let text = engine.tree().text(&id).unwrap();
    assert_eq!(text.text.as_deref(), Some("भेजें"));
    assert_eq!(text.placeholder.as_deref(), Some("कुछ पूछें..."));
    assert_eq!(text.title.as_deref(), Some("भेजें"));
    assert_eq!(text.aria_label.as_deref(), Some("संपर्क"));

    engine.translate_to("en").await.unwrap();
    assert_eq!(engine.tree().text(&id), engine.original(&id));

    println!("✅ 辅助字段测试通过");
}

/// 后注册的节点在下一次切换时被覆盖
#[tokio::test]
async fn test_late_registered_nodes_are_snapshotted() {
    let engine = registry_engine(&["Home"], scenario_table());
    engine.translate_to("hi").await.unwrap();

    let about = engine.tree().register(NodeText::text("About"));
    assert!(engine.original(&about).is_none());

    engine.translate_to("hi").await.unwrap();
    assert_eq!(texts_of(engine.tree()), vec!["मुख्य", "परिचय"]);
    assert_eq!(
        engine.original(&about).unwrap().text.as_deref(),
        Some("About")
    );

    println!("✅ 新增节点测试通过");
}

/// 并发请求严格排队：先 hi 后 en，最终为英文
#[tokio::test(start_paused = true)]
async fn test_concurrent_requests_queue_in_order() {
    let lookup = DelayedLookup::new(scenario_table(), Duration::from_millis(20));
    let engine = registry_engine(&["Home", "About", "Contact"], lookup);

    let (first, second) = tokio::join!(engine.translate_to("hi"), engine.translate_to("en"));
    let first = first.unwrap();
    let second = second.unwrap();

    // 第一个批次完整执行，没有被第二个请求打断
    assert_eq!(first.language, "hi");
    assert_eq!(first.nodes_written, 3);
    assert!(second.restored);

    assert_eq!(texts_of(engine.tree()), vec!["Home", "About", "Contact"]);
    assert_eq!(engine.current_language(), "en");
    assert!(!engine.is_translating());

    let (first, second) = tokio::join!(engine.translate_to("en"), engine.translate_to("hi"));
    assert!(first.unwrap().restored);
    assert_eq!(second.unwrap().nodes_written, 3);
    assert_eq!(texts_of(engine.tree()), vec!["मुख्य", "परिचय", "Contact"]);

    println!("✅ 排队语义测试通过");
}

/// 排队的切换请求依次生效
#[tokio::test(start_paused = true)]
async fn test_queued_toggles_alternate() {
    let lookup = DelayedLookup::new(scenario_table(), Duration::from_millis(5));
    let engine = registry_engine(&["Home"], lookup);

    let (a, b, c) = tokio::join!(engine.toggle(), engine.toggle(), engine.toggle());
    assert_eq!(a.unwrap().language, "hi");
    assert_eq!(b.unwrap().language, "en");
    assert_eq!(c.unwrap().language, "hi");
    assert_eq!(texts_of(engine.tree()), vec!["मुख्य"]);

    println!("✅ 切换排队测试通过");
}

/// 批次执行期间标记为进行中
#[tokio::test(start_paused = true)]
async fn test_in_flight_flag() {
    let lookup = DelayedLookup::new(scenario_table(), Duration::from_millis(50));
    let engine = registry_engine(&["Home"], lookup);

    let observe = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        engine.is_translating()
    };
    let (report, during) = tokio::join!(engine.translate_to("hi"), observe);

    assert!(report.unwrap().is_complete());
    assert!(during);
    assert!(!engine.is_translating());

    println!("✅ 进行中标记测试通过");
}

/// 切换按钮标签
#[tokio::test]
async fn test_toggle_label_follows_language() {
    let engine = registry_engine(&["Home"], scenario_table());
    assert_eq!(engine.toggle_label(), "हिंदी");

    engine.translate_to("HI").await.unwrap();
    assert_eq!(engine.current_language(), "hi");
    assert_eq!(engine.toggle_label(), "English");

    println!("✅ 切换标签测试通过");
}
