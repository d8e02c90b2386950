use shakmaty::{Bitboard, Color, Piece, Role, Square};
use superchess::cli::run_script;
use superchess::{Ability, GameConfig, GameEngine, MoveKind, PowerError};

fn superchess_fen(fen: &str) -> GameEngine {
    GameEngine::from_fen(fen, GameConfig::superpowers()).expect("valid FEN")
}

fn play(engine: &mut GameEngine, script: &str) {
    run_script(engine, script).expect("script should play");
}

fn zone_around_d4() -> Bitboard {
    [
        Square::C3,
        Square::D3,
        Square::E3,
        Square::C4,
        Square::D4,
        Square::E4,
        Square::C5,
        Square::D5,
        Square::E5,
    ]
    .into_iter()
    .collect()
}

// ---------------------------------------------------------------
// Fortress field
// ---------------------------------------------------------------

#[test]
fn fortress_stands_for_two_half_moves() {
    let mut engine = superchess_fen("4k3/8/8/8/3r4/R7/8/4K3 b - - 0 1");
    engine.set_charges(Color::Black, 1);
    let zone = zone_around_d4();
    assert!(!(engine.legal_moves(Square::A3) & zone).is_empty());

    let record = engine
        .begin_superpower_preview(Square::D4)
        .and_then(|_| engine.commit_superpower_preview(Square::D4))
        .expect("rook can raise a fortress");

    assert_eq!(record.kind, MoveKind::Ability(Ability::FortressField));
    assert_eq!(record.to, Some(Square::D4));
    assert_eq!(engine.charges(Color::Black), 0);
    assert_eq!(engine.fortress_zones().len(), 1);
    assert_eq!(engine.fortress_zones()[0].squares(), zone);
    assert_eq!(engine.fortress_zones()[0].ttl(), 2);

    // white's reply is held back
    assert!((engine.legal_moves(Square::A3) & zone).is_empty());
    play(&mut engine, "e1f1");
    assert_eq!(engine.fortress_zones()[0].ttl(), 1);
    assert!((engine.legal_moves(Square::A3) & zone).is_empty());

    // black's half-move is the second one; the zone is gone after it
    play(&mut engine, "e8f8");
    assert!(engine.fortress_zones().is_empty());
    assert!(engine.legal_moves(Square::A3).contains(Square::C3));
}

#[test]
fn fortress_does_not_block_owner() {
    let mut engine = superchess_fen("4k3/8/8/8/3r4/R7/8/4K3 b - - 0 1");
    engine.set_charges(Color::Black, 1);
    play(&mut engine, "d4*d4 e1f1");

    assert!(engine.legal_moves(Square::D4).contains(Square::D3));
}

#[test]
fn activations_age_fortress_zones() {
    let mut engine = superchess_fen("4k3/8/8/8/3r4/R7/8/1N2K3 b - - 0 1");
    engine.set_charges(Color::Black, 1);
    engine.set_charges(Color::White, 1);

    play(&mut engine, "d4*d4 b1*b2");

    assert_eq!(engine.fortress_zones()[0].ttl(), 1);
}

#[test]
fn fortress_does_not_block_ability_targets() {
    let mut engine = superchess_fen("4k3/8/8/8/3r4/R7/8/1Q2K3 b - - 0 1");
    engine.set_charges(Color::Black, 1);
    engine.set_charges(Color::White, 1);
    play(&mut engine, "d4*d4");

    assert!(
        !engine
            .all_legal_moves(Color::White)
            .iter()
            .any(|&(_, to)| to == Square::C3),
        "ordinary moves stay out of the zone"
    );
    assert!(!engine.legal_moves(Square::A3).contains(Square::C3));

    let targets = engine
        .begin_superpower_preview(Square::B1)
        .expect("queen has targets");
    assert!(targets.contains(Square::C3));

    let record = engine
        .commit_superpower_preview(Square::C3)
        .expect("abilities may land inside the zone");

    assert_eq!(record.to, Some(Square::C3));
    assert_eq!(
        engine.piece_at(Square::C3),
        Some(Piece {
            color: Color::White,
            role: Role::Queen
        })
    );
    assert_eq!(engine.charges(Color::White), 0);
}

// ---------------------------------------------------------------
// Phase shift
// ---------------------------------------------------------------

#[test]
fn phase_shift_takes_shield_instead_of_king() {
    let mut engine = superchess_fen("8/8/8/4k3/3n4/8/8/B3K3 w - - 0 1");
    engine.set_charges(Color::White, 1);

    let targets = engine
        .begin_superpower_preview(Square::A1)
        .expect("bishop has targets");
    assert!(targets.contains(Square::E5));

    let record = engine
        .commit_superpower_preview(Square::E5)
        .expect("shield redirect");

    assert!(record.redirected);
    assert_eq!(record.to, Some(Square::D4));
    assert_eq!(
        record.captured,
        vec![Piece {
            color: Color::Black,
            role: Role::Knight
        }]
    );
    assert_eq!(
        engine.piece_at(Square::D4),
        Some(Piece {
            color: Color::White,
            role: Role::Bishop
        })
    );
    assert_eq!(
        engine.piece_at(Square::E5),
        Some(Piece {
            color: Color::Black,
            role: Role::King
        })
    );
    assert_eq!(engine.charges(Color::White), 0);
}

#[test]
fn phase_shift_cannot_take_unshielded_king() {
    let mut engine = superchess_fen("8/8/8/4k3/8/8/8/B3K3 w - - 0 1");
    engine.set_charges(Color::White, 1);

    let targets = engine.superpower_targets(Square::A1).expect("bishop may act");
    assert!(!targets.contains(Square::E5));
    assert!(targets.contains(Square::H8), "rays ignore blockers");
}

// ---------------------------------------------------------------
// Other abilities
// ---------------------------------------------------------------

#[test]
fn royal_teleport_swaps_king_with_friend() {
    let mut engine = GameEngine::superchess();
    engine.set_charges(Color::White, 1);
    play(&mut engine, "e1*a1");

    assert_eq!(
        engine.piece_at(Square::A1).map(|p| p.role),
        Some(Role::King)
    );
    assert_eq!(
        engine.piece_at(Square::E1).map(|p| p.role),
        Some(Role::Rook)
    );
    assert_eq!(engine.turn(), Color::Black);
}

#[test]
fn sacrifice_removes_pawn_and_neighbours() {
    let mut engine = superchess_fen("4k3/8/8/8/3nPb2/8/8/4K3 w - - 0 1");
    engine.set_charges(Color::White, 1);

    let records = run_script(&mut engine, "e4*e4").expect("pawn can sacrifice");

    assert_eq!(records[0].to, None);
    assert_eq!(records[0].captured.len(), 2);
    assert_eq!(engine.piece_at(Square::E4), None);
    assert_eq!(engine.piece_at(Square::D4), None);
    assert_eq!(engine.piece_at(Square::F4), None);
    assert_eq!(engine.captured().len(), 2);
}

#[test]
fn dark_empress_jumps_like_a_knight() {
    let mut engine = GameEngine::superchess();
    engine.set_charges(Color::White, 1);

    let targets = engine.begin_superpower_preview(Square::D1).expect("queen has targets");
    assert_eq!(
        targets,
        Bitboard::from_square(Square::C3) | Bitboard::from_square(Square::E3)
    );
    assert_eq!(
        engine.commit_superpower_preview(Square::B2),
        Err(PowerError::NotATarget(Square::B2))
    );
    assert_eq!(engine.charges(Color::White), 1, "failed commit keeps the charge");
    assert!(engine.superpower_preview().is_none());
}

// ---------------------------------------------------------------
// Charges
// ---------------------------------------------------------------

#[test]
fn captures_earn_charges_up_to_the_cap() {
    let mut engine = superchess_fen("4k3/pppp4/8/8/8/8/8/Q3K3 w - - 0 1");

    play(&mut engine, "a1a7 e8f8 a7b7 f8e8 b7c7 e8f8 c7d7 f8g8");

    assert_eq!(engine.charges(Color::White), 3);
    assert_eq!(engine.charges(Color::Black), 0);
}

#[test]
fn activations_never_earn_charges() {
    let mut engine = superchess_fen("4k3/8/8/8/8/2p5/8/3QK3 w - - 0 1");
    engine.set_charges(Color::White, 1);

    let record = run_script(&mut engine, "d1*c3").expect("queen jumps onto the pawn");

    assert_eq!(record[0].captured.len(), 1);
    assert_eq!(engine.charges(Color::White), 0);
}

#[test]
fn classic_games_have_no_powers() {
    let mut engine = GameEngine::classic();
    engine.set_charges(Color::White, 3);

    assert_eq!(engine.charges(Color::White), 0);
    assert_eq!(
        engine.begin_superpower_preview(Square::D1),
        Err(PowerError::Disabled)
    );
}
