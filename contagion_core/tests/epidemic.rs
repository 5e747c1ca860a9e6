//! End-to-end behavior of the automaton through the public API.

use contagion_core::{
    Coord, EpidemicParams, ExecutionMode, HealthState, RandomSource, Scheduler, Seeding,
    Simulation, Stencil,
};

fn five_by_five() -> EpidemicParams {
    EpidemicParams {
        width: 5,
        height: 5,
        radius: 1,
        encounters: 4,
        transmission_rate: 1.0,
        days_in_incubation: 1,
        seeding: Seeding::At(vec![Coord::new(2, 2)]),
        ..Default::default()
    }
}

#[test]
fn test_five_by_five_first_tick() {
    let mut sim = Simulation::new(five_by_five(), 2024).unwrap();
    sim.step();
    let snapshot = sim.snapshot();

    let neighbors = [
        Coord::new(2, 1),
        Coord::new(1, 2),
        Coord::new(3, 2),
        Coord::new(2, 3),
    ];
    for coord in neighbors {
        assert_eq!(snapshot.state(coord), Some(HealthState::Incubating), "at {}", coord);
    }

    let seed = snapshot.state(Coord::new(2, 2)).unwrap();
    assert!(
        matches!(seed, HealthState::Symptomatic | HealthState::Quarantined),
        "seed resolved to {}",
        seed
    );

    let census = snapshot.census();
    assert_eq!(census.incubating, 4);
    assert_eq!(census.healthy, 20);
    assert_eq!(census.symptomatic + census.quarantined, 1);
}

#[test]
fn test_full_transmission_pending_then_committed() {
    let params = EpidemicParams {
        width: 11,
        height: 11,
        radius: 2,
        encounters: 100,
        transmission_rate: 1.0,
        days_in_incubation: 5,
        ..Default::default()
    };
    let sim = Simulation::new(params.clone(), 7).unwrap();
    let center = sim.seed_cells()[0];

    let mut lattice = sim.lattice().clone();
    let stencil = Stencil::von_neumann(params.radius, params.width, params.height);
    let mut scheduler = Scheduler::new(stencil, ExecutionMode::Sequential);
    let random = RandomSource::new(7);

    let pending = scheduler.decide(&lattice, &params, random.streams(0));
    let within: Vec<Coord> = lattice
        .neighborhood(center, params.radius)
        .into_iter()
        .map(|c| c.coord())
        .collect();
    assert_eq!(within.len(), 12);

    for coord in &within {
        assert_eq!(pending.get(*coord), Some(HealthState::Incubating));
        assert_eq!(lattice.cell(*coord).unwrap().state(), HealthState::Healthy);
    }
    assert_eq!(pending.infections(), 12);

    scheduler.commit(&mut lattice, pending);
    for coord in &within {
        assert_eq!(lattice.cell(*coord).unwrap().state(), HealthState::Incubating);
    }
    let infected = lattice
        .cells()
        .iter()
        .filter(|c| c.state() == HealthState::Incubating)
        .count();
    assert_eq!(infected, 13);
}

#[test]
fn test_incubation_timing() {
    for days in 1..8 {
        let params = EpidemicParams {
            width: 3,
            height: 3,
            transmission_rate: 0.0,
            days_in_incubation: days,
            ..Default::default()
        };
        let mut sim = Simulation::new(params, 1).unwrap();
        let seed = sim.seed_cells()[0];

        for tick in 1..days {
            sim.step();
            let cell = sim.lattice().cell(seed).unwrap();
            assert_eq!(cell.state(), HealthState::Incubating, "left early at tick {}", tick);
            assert_eq!(cell.incubation_day(), tick + 1);
        }

        sim.step();
        let cell = sim.lattice().cell(seed).unwrap();
        assert_ne!(cell.state(), HealthState::Incubating, "days_in_incubation = {}", days);
        assert_eq!(cell.incubation_day(), days);
    }
}

#[test]
fn test_zero_incubation_never_resolves() {
    // The exit test is an equality against a counter that starts at 1
    let params = EpidemicParams {
        width: 3,
        height: 3,
        transmission_rate: 0.0,
        days_in_incubation: 0,
        ..Default::default()
    };
    let mut sim = Simulation::new(params, 1).unwrap();
    for _ in 0..20 {
        sim.step();
    }
    let cell = sim.lattice().cell(sim.seed_cells()[0]).unwrap();
    assert_eq!(cell.state(), HealthState::Incubating);
    assert_eq!(cell.incubation_day(), 21);
}

#[test]
fn test_quarantine_duration_counts_from_entry() {
    let params = EpidemicParams {
        width: 3,
        height: 3,
        transmission_rate: 0.0,
        days_in_incubation: 1,
        days_with_symptoms: 3,
        self_quarantine_rate: 1.0,
        ..Default::default()
    };
    let mut sim = Simulation::new(params, 1).unwrap();
    let seed = sim.seed_cells()[0];

    sim.step();
    let cell = sim.lattice().cell(seed).unwrap();
    assert_eq!(cell.state(), HealthState::Quarantined);
    assert_eq!(cell.symptom_day(), 1);

    sim.step();
    sim.step();
    assert_eq!(sim.lattice().cell(seed).unwrap().state(), HealthState::Quarantined);

    sim.step();
    assert_eq!(sim.lattice().cell(seed).unwrap().state(), HealthState::Recovered);
}

#[test]
fn test_certain_death_without_hospitals() {
    let params = EpidemicParams {
        width: 3,
        height: 3,
        transmission_rate: 0.0,
        days_in_incubation: 1,
        days_with_symptoms: 1,
        self_quarantine_rate: 0.0,
        fatality_rate: 1.0,
        hospital_capacity: 0.0,
        ..Default::default()
    };
    let mut sim = Simulation::new(params, 1).unwrap();
    sim.step();
    assert_eq!(sim.census().symptomatic, 1);
    sim.step();
    assert_eq!(sim.census().dead, 1);

    // Terminal: nothing changes afterwards
    let frozen = sim.snapshot();
    for _ in 0..5 {
        sim.step();
    }
    assert_eq!(sim.snapshot().states(), frozen.states());
}

#[test]
fn test_reproducible_runs() {
    let params = EpidemicParams {
        width: 40,
        height: 40,
        transmission_rate: 0.3,
        radius: 4,
        days_in_incubation: 3,
        days_with_symptoms: 3,
        seeding: Seeding::Random { count: 4 },
        ..Default::default()
    };

    let mut a = Simulation::new(params.clone(), 99).unwrap();
    let mut b = Simulation::new(params.clone(), 99)
        .unwrap()
        .with_execution(ExecutionMode::Parallel);

    for _ in 0..40 {
        a.step();
        b.step();
        assert_eq!(a.snapshot(), b.snapshot());
    }

    // A different seed takes a different path
    let mut c = Simulation::new(params, 100).unwrap();
    for _ in 0..40 {
        c.step();
    }
    assert_ne!(a.snapshot().states(), c.snapshot().states());
}
