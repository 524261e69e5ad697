//! Text output for pairings and standings

use std::fmt::Display;

use swiss_core::{Board, Outcome, Pairing, PlayerId};
use swiss_tournament::{PairingSet, PairingWarning, RankedStandings, RankedTeamStandings, Section};

// ============================================================================
// Pairings
// ============================================================================

pub fn print_pairings(section: &Section, set: &PairingSet) {
    let name = |id: PlayerId| {
        section
            .player(id)
            .map_or_else(|| id.to_string(), |p| format!("{} ({})", p.name, rating_text(p.rating)))
    };

    println!("\n=== {} round {} ===", set.section, set.round);
    for pairing in &set.pairings {
        let label = pairing
            .team_match
            .as_ref()
            .map(|m| format!("  [{} - {}]", m.home, m.away.as_deref().unwrap_or("bye")))
            .unwrap_or_default();
        match pairing.board {
            Board::Game { white, black } => println!(
                "{:>4}  {:<32} {:^7} {:<32}{}",
                pairing.id.board,
                name(white),
                result_text(pairing),
                name(black),
                label
            ),
            Board::Bye { player, bye, points } => {
                println!("{:>4}  {:<32} {:?} bye, {} pts{}", pairing.id.board, name(player), bye, points, label)
            }
        }
    }

    for warning in &set.warnings {
        println!("  note: {}", describe(&warning.clone().map(&name)));
    }
    for warning in &set.team_warnings {
        println!("  note: {}", describe(warning));
    }
}

fn describe<K: Display>(warning: &PairingWarning<K>) -> String {
    match warning {
        PairingWarning::ForcedRematch { first, second } => format!("{first} and {second} meet again"),
        PairingWarning::ColorOverride {
            player,
            wanted,
            strength,
        } => format!("{player} wanted {wanted:?} ({strength:?})"),
        PairingWarning::Float {
            player,
            direction,
            score,
            opponent_score,
        } => format!("{player} floats {direction:?} ({score} vs {opponent_score})"),
        PairingWarning::RepeatedBye { player, previous_byes } => {
            format!("{player} receives bye number {}", previous_byes + 1)
        }
        PairingWarning::ShortLineup {
            team,
            available,
            boards,
        } => format!("{team} fields {available} of {boards} boards"),
    }
}

fn result_text(pairing: &Pairing) -> &'static str {
    match pairing.result {
        None => "-",
        Some(r) => match (r.outcome, r.forfeit) {
            (Outcome::WhiteWin, false) => "1-0",
            (Outcome::BlackWin, false) => "0-1",
            (Outcome::Draw, _) => "1/2",
            (Outcome::WhiteWin, true) => "+-",
            (Outcome::BlackWin, true) => "-+",
        },
    }
}

fn rating_text(rating: Option<u32>) -> String {
    rating.map_or_else(|| "unr".to_string(), |r| r.to_string())
}

// ============================================================================
// Standings
// ============================================================================

pub fn print_standings(standings: &RankedStandings) {
    println!("\n=== {} after round {} ===", standings.section, standings.through_round);
    if standings.is_empty() {
        println!("No pairings yet");
        return;
    }

    let header: Vec<String> = standings
        .rows
        .first()
        .map(|r| r.tiebreaks.iter().map(|t| t.tiebreak.label()).collect())
        .unwrap_or_default();
    println!("{:>4}  {:<28} {:>5} {:>5}  {}", "Rank", "Player", "Rtg", "Pts", header.join("  "));

    for row in &standings.rows {
        let rank = if row.co_ranked {
            format!("{}=", row.rank)
        } else {
            row.rank.to_string()
        };
        let tiebreaks: Vec<String> = row
            .tiebreaks
            .iter()
            .map(|t| t.value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}")))
            .collect();
        let withdrawn = if row.withdrawn { " (wd)" } else { "" };
        println!(
            "{:>4}  {:<28} {:>5} {:>5.1}  {}",
            rank,
            format!("{}{}", row.name, withdrawn),
            rating_text(row.rating),
            row.score,
            tiebreaks.join("  ")
        );
    }
}

pub fn print_team_standings(standings: &RankedTeamStandings) {
    println!("\n=== {} teams after round {} ===", standings.section, standings.through_round);
    println!("{:>4}  {:<24} {:>5} {:>6}  {:>3} {:>3} {:>3}", "Rank", "Team", "MP", "GP", "W", "D", "L");
    for row in &standings.rows {
        println!(
            "{:>4}  {:<24} {:>5.1} {:>6.1}  {:>3} {:>3} {:>3}",
            row.rank, row.team, row.match_points, row.game_points, row.wins, row.draws, row.losses
        );
    }

    for m in &standings.matches {
        match &m.away {
            Some(away) => println!(
                "  {} {} - {} {}{}",
                m.home,
                m.home_game_points,
                m.away_game_points,
                away,
                if m.complete { "" } else { " (in progress)" }
            ),
            None => println!("  {} has a bye", m.home),
        }
    }
}
