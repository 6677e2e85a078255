mod kinematics_tests;
mod motion_tests;
