//! Declarations driven end to end against runs, a scenario and a map on disk

use std::path::Path;

use image::RgbImage;
use run_plotter::config::PlotterConfig;
use run_plotter::declaration::Declaration;
use run_plotter::dispatch::run_declaration;
use run_plotter::map::MAP_DESCRIPTOR;
use run_plotter::output::MemorySink;
use run_plotter::plot::FigureBody;
use run_plotter::run::{METRICS_FILE, PARAMS_FILE};

const HEADER: &str = "episode,curvature,path_length,velocity,path,time_diff,time,result";

/// Two runs on one scenario, plus the scenario and its 40x40 px map.
fn workspace(root: &Path) -> PlotterConfig {
    let config = PlotterConfig {
        data_dir: root.join("data"),
        declarations_dir: root.join("plot_declarations"),
        scenarios_dir: root.join("scenarios"),
        maps_dir: root.join("maps"),
        plots_dir: root.join("plots"),
        force_save: false,
    };

    // 15 samples along y = 1 m; only 5 survive trimming
    let path: Vec<String> = (0..15).map(|i| format!("[{i}, 1, 0]")).collect();
    let path = format!("[{}]", path.join(", "));
    for (run, namespace, results) in [
        ("run_a", "sim_1", ["GOAL_REACHED", "COLLISION"]),
        ("run_b", "sim_2", ["GOAL_REACHED", "GOAL_REACHED"]),
    ] {
        let dir = config.data_dir.join(run);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join(PARAMS_FILE),
            format!(
                "local_planner: dwa\nagent_name: burger\nmodel: burger\n\
                 namespace: {namespace}\nscenario_file: arena.yaml\n"
            ),
        )
        .unwrap();
        let mut csv = format!("{HEADER}\n");
        for (episode, result) in results.iter().enumerate() {
            let time_diff = 1_000_000_000 * (3 - episode);
            csv.push_str(&format!(
                "{episode},\"[0.1, 0.2]\",3.0,\"[[1, 0, 0], [0, 3, 0]]\",\"{}\",{time_diff},\"[0, 1000000000]\",{result}\n",
                path.replace('"', "\"\"")
            ));
        }
        std::fs::write(dir.join(METRICS_FILE), csv).unwrap();
    }

    std::fs::create_dir_all(&config.scenarios_dir).unwrap();
    std::fs::write(
        config.scenarios_dir.join("arena.yaml"),
        "map: arena\nrobot:\n  start: [0.0, 1.0, 0.0]\n  goal: [15.0, 1.0, 0.0]\n\
         obstacles:\n  static:\n    - pos: [5.0, 5.0]\n  dynamic:\n    - waypoints: [[2, 2], [4, 2], [4, 4]]\n",
    )
    .unwrap();

    let map_dir = config.maps_dir.join("arena");
    std::fs::create_dir_all(&map_dir).unwrap();
    RgbImage::new(40, 40).save(map_dir.join("arena.png")).unwrap();
    std::fs::write(
        map_dir.join(MAP_DESCRIPTOR),
        "image: arena.png\nresolution: 0.5\norigin: [0.0, 0.0, 0.0]\n",
    )
    .unwrap();

    config
}

#[test]
fn test_result_only_declaration_yields_one_figure() {
    let dir = tempfile::tempdir().unwrap();
    let config = workspace(dir.path());
    let declaration = Declaration::parse(
        "datasets: [run_a, run_b]\nresults:\n  title: Outcomes\n  save_name: results\n",
    )
    .unwrap();

    let mut sink = MemorySink::new();
    let count = run_declaration(&declaration, &config, &mut sink).unwrap();

    assert_eq!(count, 1);
    let figures = sink.into_figures();
    assert_eq!(figures.len(), 1);
    assert_eq!(figures[0].save_name(), "results");
    let FigureBody::Bars { categories, groups } = &figures[0].body else {
        panic!("expected a count chart");
    };
    assert_eq!(categories, &["TIMEOUT", "GOAL_REACHED", "COLLISION"]);
    let labels: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
    assert_eq!(labels, vec!["sim_1", "sim_2"]);
    assert_eq!(groups[0].values, vec![0.0, 1.0, 1.0]);
    assert_eq!(groups[1].values, vec![0.0, 2.0, 0.0]);
}

#[test]
fn test_full_declaration_in_fixed_order() {
    let dir = tempfile::tempdir().unwrap();
    let config = workspace(dir.path());
    let declaration = Declaration::parse(
        r"
datasets: [run_a, run_b]
show_plots: true
create_best_plots:
  title: Best
  save_name: best
episode_plots_for_namespaces:
  title: Paths
  save_name: paths
  desired_results: [GOAL_REACHED]
all_episodes_distribution:
  - {data_key: time_diff, plot_key: box, title: Time, save_name: time}
all_episodes_categorical:
  - {data_key: path_length, plot_key: bar, title: Length, save_name: length}
aggregated_line:
  - {data_key: curvature, aggregate: max, title: Max curvature, save_name: max_curvature}
aggregated_distribution:
  - {data_key: velocity, aggregate: mean, title: Mean velocity, save_name: mean_velocity}
single_episode_distribution:
  - {data_key: velocity, title: Velocity, save_name: velocity, plot_key: violin}
single_episode_line:
  - {data_key: curvature, step_size: 1, title: Curvature, save_name: curvature}
results: {title: Outcomes, save_name: results}
",
    )
    .unwrap();

    let mut sink = MemorySink::new();
    let count = run_declaration(&declaration, &config, &mut sink).unwrap();

    let names: Vec<&str> = sink.figures().iter().map(|f| f.save_name()).collect();
    assert_eq!(
        names,
        vec![
            "results",
            "curvature",
            "velocity",
            "mean_velocity",
            "max_curvature",
            "length",
            "time",
            "paths_sim_1",
            "paths_sim_2",
            "best",
        ]
    );
    assert_eq!(count, names.len());

    let FigureBody::Map(best) = &sink.figures()[9].body else {
        panic!("expected a map overlay");
    };
    assert_eq!(best.paths.len(), 2);
    assert_eq!(best.paths[0].points.len(), 5);
    assert_eq!(best.paths[0].points[0], (0.0, 38.0));
    assert_eq!(best.start, Some((0.0, 38.0)));
    assert_eq!(best.static_obstacles.len(), 1);

    let FigureBody::Map(sim_1) = &sink.figures()[7].body else {
        panic!("expected a map overlay");
    };
    // The collision episode of sim_1 is skipped
    assert_eq!(sim_1.paths.len(), 1);
}

#[test]
fn test_declaration_with_unknown_key_fails_before_loading() {
    let result = Declaration::parse(
        "datasets: [run_a]\nsingle_episode_line:\n  - {data_key: speed, title: S, save_name: s}\n",
    );
    assert!(result.is_err());
}

#[test]
fn test_overlay_without_map_files_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = workspace(dir.path());
    std::fs::remove_dir_all(&config.maps_dir).unwrap();
    let declaration = Declaration::parse(
        "datasets: [run_a, run_b]\ncreate_best_plots: {title: B, save_name: b}\n",
    )
    .unwrap();

    let mut sink = MemorySink::new();
    assert!(run_declaration(&declaration, &config, &mut sink).is_err());
    assert!(sink.figures().is_empty());
}
