//! The feature pipeline: raw bars → fully scored FeatureBars.
//!
//! Pure and batch-shaped: `compute_features(bars, cfg)` is a function of the
//! bar slice alone, so recomputing any prefix yields the same leading rows
//! (the lookahead invariant the integration suite enforces). The tick-driven
//! paper path reuses it verbatim on its growing history.

pub mod levels;
pub mod mtf;
pub mod patterns;
pub mod scoring;

use crate::config::ScalperConfig;
use crate::domain::{Bar, ExchangeTime, FeatureBar, Session};
use crate::indicators::rolling::{rolling_mean_min1, rolling_min_min1};
use crate::indicators::{dmi, macd, rolling_percent_rank, session_vwap, supertrend, Atr, Ema, Indicator, Rsi};

use levels::LevelInputs;
use patterns::PatternInputs;

/// Compute one FeatureBar per input bar.
///
/// Bars are assumed well-formed, deduplicated, and chronologically ordered
/// (the feed boundary enforces this).
pub fn compute_features(bars: &[Bar], cfg: &ScalperConfig) -> Vec<FeatureBar> {
    let n = bars.len();
    let ind = &cfg.indicators;

    // ── Exchange clock and sessions ──
    let ex: Vec<ExchangeTime> = bars
        .iter()
        .map(|b| ExchangeTime::of(b.ts, cfg.session.exchange_tz))
        .collect();
    let sessions: Vec<Session> = ex
        .iter()
        .map(|t| Session::from_exchange_time(t.hour, t.minute))
        .collect();

    // ── Trend EMAs ──
    let ema_fast = Ema::new(ind.ema_fast).compute(bars);
    let ema_slow = Ema::new(ind.ema_slow).compute(bars);
    let ema_trend = Ema::new(ind.ema_trend).compute(bars);
    let ema_long = Ema::new(ind.ema_long).compute(bars);

    // ── Oscillators ──
    let rsi = Rsi::new(ind.rsi_len).compute(bars);
    let macd_out = macd(bars, ind.macd_fast, ind.macd_slow, ind.macd_signal);
    let dmi_out = dmi(bars, ind.adx_len);
    let atr = Atr::new(ind.atr_len).compute(bars);

    // ── Trend flip ──
    let st = supertrend(bars, ind.st_period, ind.st_multiplier);

    // ── Session VWAP ──
    let day_ids: Vec<i64> = ex
        .iter()
        .map(|t| crate::indicators::vwap::trading_day_id(t.day_number, t.hour, cfg.session.vwap_anchor_hour))
        .collect();
    let vwap = session_vwap(bars, &day_ids);

    // ── Volume ──
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume as f64).collect();
    let vol_ma = rolling_mean_min1(&volumes, ind.vol_sma_len);
    let vol_ratio: Vec<f64> = (0..n)
        .map(|i| if vol_ma[i] > 0.0 { volumes[i] / vol_ma[i] } else { 0.0 })
        .collect();
    let vol_above: Vec<bool> = vol_ratio.iter().map(|&r| r >= ind.vol_above_ratio).collect();
    let vol_spike: Vec<bool> = vol_ratio.iter().map(|&r| r >= ind.vol_spike_ratio).collect();
    let vol_weak: Vec<bool> = vol_ratio.iter().map(|&r| r < ind.vol_weak_ratio).collect();
    let vol_declining: Vec<bool> = (0..n)
        .map(|i| i >= 2 && bars[i].volume < bars[i - 1].volume && bars[i - 1].volume < bars[i - 2].volume)
        .collect();

    // ── Multi-timeframe alignment ──
    let mtf_cols = mtf::compute_mtf(bars, &ex);

    // ── Patterns ──
    let pattern_cols = patterns::compute_patterns(
        &PatternInputs {
            bars,
            sessions: &sessions,
            vol_ratio: &vol_ratio,
            vol_above: &vol_above,
            vol_spike: &vol_spike,
            macd_line: &macd_out.line,
            macd_signal: &macd_out.signal,
            rsi: &rsi,
        },
        &cfg.patterns,
    );

    // ── Key levels ──
    let level_cols = levels::compute_levels(
        &LevelInputs {
            bars,
            atr: &atr,
            vwap: &vwap,
            prev_day_high: &mtf_cols.prev_day_high,
            prev_day_low: &mtf_cols.prev_day_low,
            prev_day_close: &mtf_cols.prev_day_close,
            prev_week_high: &mtf_cols.prev_week_high,
            prev_week_low: &mtf_cols.prev_week_low,
        },
        &cfg.patterns,
    );

    // ── Scoring inputs ──
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let pivot_low = rolling_min_min1(&lows, cfg.patterns.pivot_lookback);
    let atr_pctile = rolling_percent_rank(&atr, cfg.volatility.window(), cfg.volatility.min_samples);

    // ── Assembly ──
    let mut features = Vec::with_capacity(n);
    for i in 0..n {
        let bar = &bars[i];
        let mut fb = FeatureBar {
            ts: bar.ts,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            hour: ex[i].hour,
            minute: ex[i].minute,
            weekday: ex[i].weekday,
            session: sessions[i],
            ema_fast: ema_fast[i],
            ema_slow: ema_slow[i],
            ema_trend: ema_trend[i],
            ema_long: ema_long[i],
            ema_slope_bull: i >= 1 && ema_trend[i] > ema_trend[i - 1],
            primary_bull: bar.close > ema_trend[i] && ema_trend[i] > ema_long[i],
            rsi: rsi[i],
            macd_line: macd_out.line[i],
            macd_signal: macd_out.signal[i],
            macd_hist: macd_out.hist[i],
            adx: dmi_out.adx[i],
            di_plus: dmi_out.di_plus[i],
            di_minus: dmi_out.di_minus[i],
            atr: atr[i],
            st_line: st.line[i],
            st_bullish: st.bullish[i],
            st_flip_bull: st.flip_bull(i),
            vwap: vwap[i],
            vol_ratio: vol_ratio[i],
            vol_above: vol_above[i],
            vol_spike: vol_spike[i],
            vol_weak: vol_weak[i],
            vol_declining: vol_declining[i],
            mtf1h_bullish: mtf_cols.mtf1h_bullish[i],
            mtf4h_bullish: mtf_cols.mtf4h_bullish[i],
            mtf_strong_bull: mtf_cols.mtf_strong_bull[i],
            daily_bullish: mtf_cols.daily_bullish[i],
            bull_engulf: pattern_cols.bull_engulf[i],
            hammer: pattern_cols.hammer[i],
            hammer_confirm: pattern_cols.hammer_confirm[i],
            morning_star: pattern_cols.morning_star[i],
            bull_breakout: pattern_cols.bull_breakout[i],
            bull_cons_breakout: pattern_cols.bull_cons_breakout[i],
            bull_sess_break: pattern_cols.bull_sess_break[i],
            bull_shift: pattern_cols.bull_shift[i],
            bear_shift: pattern_cols.bear_shift[i],
            longs_blocked: pattern_cols.longs_blocked[i],
            near_support: level_cols.near_support[i],
            near_resist: level_cols.near_resist[i],
            near_daily_level: level_cols.near_daily_level[i],
            ..FeatureBar::default()
        };

        fb.score = scoring::long_score(&fb, &cfg.weights);
        fb.confirmations = scoring::confirmations(&fb);
        fb.base_thresh = scoring::base_threshold(fb.confirmations);
        fb.session_penalty = scoring::session_penalty(fb.session);
        fb.vol_adjust = scoring::volatility_adjustment(atr_pctile[i]);
        fb.effective_thresh = fb.base_thresh + fb.session_penalty + fb.vol_adjust;
        fb.tech_stop = scoring::technical_stop(
            bar.close,
            pivot_low[i],
            bar.low,
            atr[i],
            fb.st_bullish,
            fb.st_line,
            cfg.risk.max_stop_points,
        );
        fb.ready = i >= cfg.warmup_bars;

        features.push(fb);
    }

    features
}
