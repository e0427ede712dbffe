/// 配置載入測試
///
/// 驗證配置包的表名分派、預設值與錯誤處理

use ability_system::*;

const SKILL_BUNDLE_YAML: &str = r#"
SkillConfig:
  - id: 1001
    name: 火焰刀
    shape: sector
    radius: 6.0
    width: 90.0
    duration_type: times
    duration_value: 3
    interval_value: 1.0
    cooldown: 8.0
    value: -40
    target_select_type: shape
    target_count: 0
  - id: 1002
    name: 火繩銃
    move_target_type: target
    move_speed: 20.0
    move_distance: 30.0
    pierce_count: 2
    homing_strength: 6.0
    value: 55
    effect_id: 9
HeroSkillConfig:
  - id: 1
    name: 伊達政宗
    skill_ids: [1001, 1002]
"#;

#[test]
fn test_load_yaml_bundle() {
    let mut manager = ConfigManager::new();
    let count = manager.load_from_str(SKILL_BUNDLE_YAML, ConfigFormat::Yaml).unwrap();
    assert_eq!(count, 3);
    assert_eq!(manager.skill_count(), 2);
    assert_eq!(manager.hero_count(), 1);

    let blade = manager.skill_config(1001).unwrap();
    assert_eq!(blade.shape, SkillShape::Sector);
    assert_eq!(blade.duration_type, DurationType::Times);
    assert_eq!(blade.target_select_type, TargetSelectType::Shape);
    assert_eq!(blade.target_count, 0);
    assert!(!blade.is_projectile());
    // 未填的欄位使用預設值
    assert_eq!(blade.stat_name, "hp");
    assert_eq!(blade.effect_group_type, EffectGroupType::Enemy);

    let gun = manager.skill_config(1002).unwrap();
    assert_eq!(gun.move_target_type, Some(MoveTargetType::Target));
    assert_eq!(gun.pierce_count, 2);
    assert!(gun.is_projectile());

    let hero = manager.hero_skill_config(1).unwrap();
    assert_eq!(hero.skill_ids, vec![1001, 1002]);
}

#[test]
fn test_load_json_bundle() {
    let json = r#"{
        "SkillConfig": [
            { "id": 5, "effect_group_type": "self", "calc_type": "multiply", "value_type": "percent", "value": 150 }
        ]
    }"#;
    let mut manager = ConfigManager::new();
    assert_eq!(manager.load_from_str(json, ConfigFormat::Json).unwrap(), 1);
    let config = manager.skill_config(5).unwrap();
    assert_eq!(config.effect_group_type, EffectGroupType::Self_);
    assert_eq!(config.calc_type, CalcType::Multiply);
    assert_eq!(config.value_type, ValueType::Percent);
}

#[test]
fn test_missing_ids_are_absent() {
    let mut manager = ConfigManager::new();
    manager.load_from_str(SKILL_BUNDLE_YAML, ConfigFormat::Yaml).unwrap();
    assert!(manager.skill_config(4242).is_none());
    assert!(manager.hero_skill_config(99).is_none());
}

#[test]
fn test_unknown_table_is_rejected() {
    let yaml = "MonsterConfig:\n  - id: 1\n";
    let mut manager = ConfigManager::new();
    let err = manager.load_from_str(yaml, ConfigFormat::Yaml).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownTable(ref key) if key == "MonsterConfig"));
}

#[test]
fn test_duplicate_skill_id() {
    let yaml = "SkillConfig:\n  - id: 1\n  - id: 1\n";
    let mut manager = ConfigManager::new();
    let err = manager.load_from_str(yaml, ConfigFormat::Yaml).unwrap_err();
    assert!(matches!(err, ConfigError::Duplicate { id: 1, .. }));
}

#[test]
fn test_invalid_record_fails_load() {
    let yaml = "SkillConfig:\n  - id: 3\n    interval_value: -0.5\n";
    let mut manager = ConfigManager::new();
    assert!(matches!(
        manager.load_from_str(yaml, ConfigFormat::Yaml),
        Err(ConfigError::Invalid { id: 3, .. })
    ));
}

#[test]
fn test_every_table_key_is_unique() {
    for (i, a) in CONFIG_TABLES.iter().enumerate() {
        for b in CONFIG_TABLES.iter().skip(i + 1) {
            assert_ne!(a.key, b.key);
        }
    }
}
