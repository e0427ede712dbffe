use std::path::Path;

use ability_system::ConfigManager;
use anyhow::Context;
use chrono::Local;
use log::{debug, info, warn};

use omoba_skill::util::Clock;
use omoba_skill::*;

const SETTING_PATH: &str = "sim.toml";
const DEMO_HERO_ID: u32 = 1;

/// 有 log4rs 設定檔就用，否則輸出到 stdout
fn init_logger(path: &str) -> anyhow::Result<()> {
    if Path::new(path).exists() {
        log4rs::init_file(path, Default::default())
            .with_context(|| format!("無法載入 log 設定 {}", path))?;
        return Ok(());
    }
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {} {}",
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log::LevelFilter::Info)
        .chain(std::io::stdout())
        .apply()?;
    Ok(())
}

/// 英雄身上可施放的技能都放出去
fn auto_cast(state: &mut State, hero: Entity) {
    let ready: Vec<u32> = state
        .skills()
        .contents()
        .iter()
        .filter(|c| c.source == hero && c.can_cast().is_ok())
        .map(|c| c.skill_id)
        .collect();
    let target = state
        .registry()
        .query::<Faction>()
        .find(|(e, f)| f.team_id != 1 && is_alive(state.registry(), *e))
        .map(|(e, _)| e);

    for skill_id in ready {
        let mut request = SkillRequest::new(hero, skill_id);
        if let Some(t) = target {
            request = request.at_target(t);
        }
        if let Err(err) = state.cast(request) {
            debug!("技能 {} 未施放: {}", skill_id, err);
        }
    }
}

fn main() -> anyhow::Result<()> {
    let setting = if Path::new(SETTING_PATH).exists() {
        SimSetting::load(SETTING_PATH).with_context(|| format!("讀取 {} 失敗", SETTING_PATH))?
    } else {
        SimSetting::default()
    };
    init_logger(&setting.log_config)?;

    let mut configs = ConfigManager::new();
    match configs.load_from_file(&setting.skill_config) {
        Ok(count) => info!("載入技能配置 {} 筆: {}", count, setting.skill_config),
        Err(err) => warn!("無法讀取技能配置 {}: {}", setting.skill_config, err),
    }

    let mut state = State::new(setting.clone(), configs);
    let hero = StateInitializer::create_demo_scene(&mut state, DEMO_HERO_ID)?;

    let mut clock = Clock::new(setting.tick_interval());
    let fixed_dt = setting.tick_interval();
    for _ in 0..setting.total_ticks() {
        if !is_alive(state.registry(), hero) {
            info!("英雄 {} 陣亡，結束模擬", hero);
            break;
        }
        auto_cast(&mut state, hero);

        let dt = if setting.realtime { clock.dt() } else { fixed_dt };
        state.tick(dt)?;

        for outcome in state.take_outcomes() {
            match &outcome {
                Outcome::Death { .. } | Outcome::ProjectileDestroyed { .. } => {
                    info!("{}", serde_json::to_string(&outcome)?)
                }
                _ => debug!("{}", serde_json::to_string(&outcome)?),
            }
        }

        if setting.realtime {
            clock.tick();
        }
    }

    let alive = state
        .registry()
        .query::<Attributes>()
        .filter(|(_, a)| a.is_alive())
        .count();
    info!(
        "模擬結束 tick {} 時間 {:.2}s 存活 {} 飛行中投射物 {}",
        state.get_tick(),
        state.get_time(),
        alive,
        state.projectiles().len()
    );
    Ok(())
}
